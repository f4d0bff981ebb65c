//! Collaborators the repositories hand work to: code generation,
//! notification delivery and the SMS job queue.

mod codes;
mod notifier;
mod sms_queue;

pub use codes::{CodeGenerator, RandomCodeGenerator};
pub use notifier::{DatabaseNotifier, Notifier};
pub use sms_queue::{ApalisSmsQueue, SmsQueue};

#[cfg(any(test, feature = "test-utils"))]
pub use codes::MockCodeGenerator;
#[cfg(any(test, feature = "test-utils"))]
pub use notifier::MockNotifier;
#[cfg(any(test, feature = "test-utils"))]
pub use sms_queue::MockSmsQueue;
