// storefront/src/models/profile.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Bare profile object or `{ "profile": {...} }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProfilePayload {
  Wrapped { profile: Profile },
  Bare(Profile),
}

impl ProfilePayload {
  pub fn into_profile(self) -> Profile {
    match self {
      ProfilePayload::Wrapped { profile } | ProfilePayload::Bare(profile) => profile,
    }
  }
}
