mod cms;
mod mailer;
mod npi;
mod object_store;

pub use cms::{CmsClient, CmsProcedure};
pub use mailer::{Mailer, SmtpMailer};
pub use npi::{filter_new_institutes, NpiClient};
pub use object_store::{BucketStore, ObjectStore};
