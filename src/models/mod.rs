//! Domain data shapes exchanged with the platform API.
//!
//! These are plain serde types with no behaviour beyond display helpers.

pub mod agent;
pub mod call_log;
pub mod knowledge;
pub mod phone;
pub mod tool;
pub mod user;
pub mod voice;

pub use agent::{
    Agent, AgentConfig, AgentDraft, CalendarSettings, CallTransferSettings, EndCallSettings,
    LlmSettings, TranscriberSettings, VoiceSettings, VoicemailSettings, WebhookSettings,
};
pub use call_log::{CallDirection, CallLog, CallLogQuery};
pub use knowledge::KnowledgeFile;
pub use phone::{PhoneImport, PhoneNumber, PhoneUpdate, ProviderCredentials, TelephonyProvider};
pub use tool::{Calendar, HttpMethod, Tool, ToolDraft, ToolKind};
pub use user::{PaymentMethod, User};
pub use voice::{CustomVoiceRequest, Voice};
