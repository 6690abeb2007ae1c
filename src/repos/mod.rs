mod cpt_codes;
mod crosswalk;
mod customers;
mod institutes;
mod manual_institutes;
mod progress;
mod uploads;

pub use cpt_codes::CptCodeRepo;
pub use crosswalk::{CrosswalkField, CrosswalkRepo};
pub use customers::CustomerRepo;
pub use institutes::InstituteRepo;
pub use manual_institutes::ManualInstituteRepo;
pub use progress::ProgressRepo;
pub use uploads::UploadRepo;
