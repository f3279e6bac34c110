use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBracket {
    Young,
    Adult,
    Senior,
}

impl AgeBracket {
    pub fn from_age(age: u32) -> Self {
        if age < 30 {
            Self::Young
        } else if age < 50 {
            Self::Adult
        } else {
            Self::Senior
        }
    }

    /// Catalog tag used for this bracket in item profile tags.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Young => "joven",
            Self::Adult => "adulto",
            Self::Senior => "mayor",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub age_bracket: Option<AgeBracket>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub emotional_history: Option<String>,
}

impl Profile {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            age: None,
            age_bracket: None,
            gender: None,
            hobbies: Vec::new(),
            goals: Vec::new(),
            emotional_history: None,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self.age_bracket = Some(AgeBracket::from_age(age));
        self
    }

    pub fn with_hobbies<I, S>(mut self, hobbies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hobbies = hobbies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_goals<I, S>(mut self, goals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.goals = goals.into_iter().map(Into::into).collect();
        self
    }

    /// Bracket derived from a known, non-zero age. The stored `age_bracket` is
    /// informational; scoring only trusts the numeric age.
    pub fn scoring_age_bracket(&self) -> Option<AgeBracket> {
        self.age.filter(|age| *age > 0).map(AgeBracket::from_age)
    }

    /// Copy of the profile without identifying fields, safe to store next to
    /// an anonymous token.
    pub fn snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            age_bracket: self.scoring_age_bracket().or(self.age_bracket),
            hobbies: self.hobbies.clone(),
            goals: self.goals.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    pub age_bracket: Option<AgeBracket>,
    pub hobbies: Vec<String>,
    pub goals: Vec<String>,
}
