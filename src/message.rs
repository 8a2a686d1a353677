use crate::error::GcmError;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// GCM rejects multicasts above this many recipients.
const MAX_REGISTRATION_IDS: usize = 100;

/// A downstream message payload. Unset fields are omitted from the
/// serialized JSON body.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Message {
    registration_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collapse_key: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    data: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delay_while_idle: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_to_live: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    restricted_package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dry_run: Option<bool>,
}

impl Message {
    /// Create an empty message. At least one registration id must be added
    /// before the message is worth sending.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registration_ids(&self) -> &[String] {
        &self.registration_ids
    }

    /// Add a recipient registration id
    pub fn add_registration_id(
        &mut self,
        id: impl Into<String>,
    ) -> Result<&mut Self, GcmError> {
        let id = id.into();
        if id.is_empty() {
            return Err(GcmError::InvalidArgument(
                "the registration id must not be empty",
            ));
        }
        if self.registration_ids.len() >= MAX_REGISTRATION_IDS {
            return Err(GcmError::InvalidArgument(
                "a message may carry at most 100 registration ids",
            ));
        }
        self.registration_ids.push(id);
        Ok(self)
    }

    /// Replace the recipient list
    pub fn set_registration_ids(
        &mut self,
        ids: Vec<String>,
    ) -> Result<&mut Self, GcmError> {
        if ids.len() > MAX_REGISTRATION_IDS {
            return Err(GcmError::InvalidArgument(
                "a message may carry at most 100 registration ids",
            ));
        }
        if ids.iter().any(|id| id.is_empty()) {
            return Err(GcmError::InvalidArgument(
                "the registration id must not be empty",
            ));
        }
        self.registration_ids = ids;
        Ok(self)
    }

    pub fn collapse_key(&self) -> Option<&str> {
        self.collapse_key.as_deref()
    }

    pub fn set_collapse_key(&mut self, key: impl Into<String>) -> Result<&mut Self, GcmError> {
        let key = key.into();
        if key.is_empty() {
            return Err(GcmError::InvalidArgument(
                "the collapse key must not be empty",
            ));
        }
        self.collapse_key = Some(key);
        Ok(self)
    }

    pub fn data(&self) -> &HashMap<String, Value> {
        &self.data
    }

    /// Add a single data entry. The key must be non-empty and not already
    /// present.
    pub fn add_data(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<&mut Self, GcmError> {
        let key = key.into();
        if key.is_empty() {
            return Err(GcmError::InvalidArgument("the data key must not be empty"));
        }
        if self.data.contains_key(&key) {
            return Err(GcmError::InvalidArgument(
                "the data key conflicts with an existing entry",
            ));
        }
        self.data.insert(key, value.into());
        Ok(self)
    }

    /// Replace the data map
    pub fn set_data(&mut self, data: HashMap<String, Value>) -> Result<&mut Self, GcmError> {
        if data.keys().any(|key| key.is_empty()) {
            return Err(GcmError::InvalidArgument("the data key must not be empty"));
        }
        self.data = data;
        Ok(self)
    }

    pub fn delay_while_idle(&self) -> Option<bool> {
        self.delay_while_idle
    }

    pub fn set_delay_while_idle(&mut self, delay: bool) -> &mut Self {
        self.delay_while_idle = Some(delay);
        self
    }

    pub fn time_to_live(&self) -> Option<u32> {
        self.time_to_live
    }

    /// Lifetime of the message on the GCM servers, in seconds
    pub fn set_time_to_live(&mut self, seconds: u32) -> &mut Self {
        self.time_to_live = Some(seconds);
        self
    }

    pub fn restricted_package_name(&self) -> Option<&str> {
        self.restricted_package_name.as_deref()
    }

    pub fn set_restricted_package_name(
        &mut self,
        name: impl Into<String>,
    ) -> Result<&mut Self, GcmError> {
        let name = name.into();
        if name.is_empty() {
            return Err(GcmError::InvalidArgument(
                "the restricted package name must not be empty",
            ));
        }
        self.restricted_package_name = Some(name);
        Ok(self)
    }

    pub fn dry_run(&self) -> Option<bool> {
        self.dry_run
    }

    pub fn set_dry_run(&mut self, dry_run: bool) -> &mut Self {
        self.dry_run = Some(dry_run);
        self
    }

    /// Serialize to the GCM request body
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
