mod dispatcher;
mod email_function;

pub use dispatcher::{EmailProvider, NotificationDispatcher};
pub use email_function::EmailFunctionClient;
