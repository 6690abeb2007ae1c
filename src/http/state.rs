use std::sync::Arc;

use crate::auth::TokenService;
use crate::catalog::CatalogEngine;
use crate::clients::{CmsClient, Mailer, NpiClient, ObjectStore};
use crate::common::error::Result;
use crate::config::Config;
use crate::db::DatabaseManager;
use crate::repos::{
    CptCodeRepo, CrosswalkRepo, CustomerRepo, InstituteRepo, ManualInstituteRepo, ProgressRepo,
    UploadRepo,
};

/// Everything the handlers share. Cheap to clone; the request path is
/// stateless apart from what lives behind these `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<CatalogEngine>,
    pub customers: Arc<CustomerRepo>,
    pub institutes: Arc<InstituteRepo>,
    pub manual_institutes: Arc<ManualInstituteRepo>,
    pub progress: Arc<ProgressRepo>,
    pub cpt_codes: Arc<CptCodeRepo>,
    pub uploads: Arc<UploadRepo>,
    pub crosswalk: Arc<CrosswalkRepo>,
    pub npi: Arc<NpiClient>,
    pub cms: Arc<CmsClient>,
    pub mailer: Arc<dyn Mailer>,
    pub objects: Arc<dyn ObjectStore>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Arc<DatabaseManager>,
        tokens: TokenService,
        mailer: Arc<dyn Mailer>,
        objects: Arc<dyn ObjectStore>,
    ) -> Result<Self> {
        let npi = Arc::new(NpiClient::new(&config.npi)?);
        let cms = Arc::new(CmsClient::new(&config.cms)?);

        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(CatalogEngine::new(db.clone())),
            customers: Arc::new(CustomerRepo::new(db.clone())),
            institutes: Arc::new(InstituteRepo::new(db.clone())),
            manual_institutes: Arc::new(ManualInstituteRepo::new(db.clone())),
            progress: Arc::new(ProgressRepo::new(db.clone())),
            cpt_codes: Arc::new(CptCodeRepo::new(db.clone())),
            uploads: Arc::new(UploadRepo::new(db.clone())),
            crosswalk: Arc::new(CrosswalkRepo::new(db)),
            npi,
            cms,
            mailer,
            objects,
            tokens,
        })
    }
}
