use crate::message::Message;
use serde::Deserialize;

/// The decoded response to a sent message, tied to the message it answers.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    body: ResponseBody,
    message: Message,
}

/// The documented GCM response body. (Being explicit here because the
/// official documentation has been removed.)
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub(crate) struct ResponseBody {
    /// ID for this set of messages/results
    #[serde(default)]
    pub multicast_id: i64,
    /// Number of messages succeeding
    #[serde(default)]
    pub success: u32,
    /// Number of messages failing
    #[serde(default)]
    pub failure: u32,
    /// Number of ids that were reassigned
    #[serde(default)]
    pub canonical_ids: u32,
    /// Per-recipient outcomes, in registration id order
    #[serde(default)]
    pub results: Vec<MessageResult>,
}

/// The delivery outcome for a single recipient
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct MessageResult {
    /// Identifier of the accepted message
    #[serde(default)]
    pub message_id: Option<String>,
    /// Replacement registration id the recipient should be stored under
    #[serde(default)]
    pub registration_id: Option<String>,
    /// Standardized error string, e.g. `NotRegistered`
    #[serde(default)]
    pub error: Option<String>,
}

impl Response {
    pub(crate) fn new(body: ResponseBody, message: Message) -> Self {
        Response { body, message }
    }

    /// The message this response answers
    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn multicast_id(&self) -> i64 {
        self.body.multicast_id
    }

    pub fn success_count(&self) -> u32 {
        self.body.success
    }

    pub fn failure_count(&self) -> u32 {
        self.body.failure
    }

    pub fn canonical_ids_count(&self) -> u32 {
        self.body.canonical_ids
    }

    pub fn results(&self) -> &[MessageResult] {
        &self.body.results
    }

    /// Pair each result with the registration id it belongs to. GCM returns
    /// results in the order the ids were sent.
    pub fn per_registration_id(&self) -> impl Iterator<Item = (&str, &MessageResult)> {
        self.message
            .registration_ids()
            .iter()
            .map(String::as_str)
            .zip(self.body.results.iter())
    }
}
