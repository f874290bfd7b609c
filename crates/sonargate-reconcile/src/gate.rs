//! Quality gate reconciler.

use async_trait::async_trait;
use sonargate_client::{DynQualityGates, gate};
use sonargate_core::Readiness;
use sonargate_store::GateRecord;

use crate::error::Error;
use crate::external::{ExternalClient, Observation};

const ERR_SHOW_GATE: &str = "cannot get quality gate";
const ERR_CREATE_GATE: &str = "cannot create quality gate";
const ERR_DEFAULT_GATE: &str = "cannot set quality gate as default";
const ERR_UPDATE_GATE: &str = "cannot update quality gate";
const ERR_DELETE_GATE: &str = "cannot delete quality gate";

/// Reconciles quality gate records against the remote instance.
pub struct GateClient {
    api: DynQualityGates,
}

impl GateClient {
    pub fn new(api: DynQualityGates) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ExternalClient for GateClient {
    type Record = GateRecord;

    async fn observe(&self, record: &mut GateRecord) -> Result<Observation, Error> {
        // A gate that was never created has nothing to look up.
        let Some(external_name) = record.external_name.clone() else {
            return Ok(Observation::absent());
        };

        let show = match self.api.show(&external_name).await {
            Ok(show) => show,
            Err(err) if err.is_not_found() => return Ok(Observation::absent()),
            Err(err) => return Err(Error::remote(ERR_SHOW_GATE, err)),
        };

        let observed = gate::observation(&show);
        record.status = Some(observed.clone());
        record.readiness = Some(Readiness::available());

        let current = record.spec.clone();
        gate::late_initialize(&mut record.spec, &observed);

        Ok(Observation::present(
            gate::is_up_to_date(Some(&record.spec), Some(&observed)),
            record.spec != current,
        ))
    }

    async fn create(&self, record: &mut GateRecord) -> Result<(), Error> {
        record.readiness = Some(Readiness::creating());

        let created = self
            .api
            .create(&gate::create_request(&record.spec))
            .await
            .map_err(|e| Error::remote(ERR_CREATE_GATE, e))?;

        // The server-assigned name is the durable identity from here on.
        record.external_name = Some(created.name.clone());

        if record.spec.default == Some(true) {
            self.api
                .set_as_default(&created.name)
                .await
                .map_err(|e| Error::remote(ERR_DEFAULT_GATE, e))?;
        }

        Ok(())
    }

    async fn update(&self, record: &mut GateRecord) -> Result<(), Error> {
        let Some(external_name) = record.external_name.clone() else {
            return Err(Error::precondition(format!(
                "external name is not set for quality gate {}",
                record.meta.name
            )));
        };

        if record.spec.name != external_name {
            self.api
                .rename(&external_name, &record.spec.name)
                .await
                .map_err(|e| Error::remote(ERR_UPDATE_GATE, e))?;

            // Rename changes identity.
            record.external_name = Some(record.spec.name.clone());
        }

        // Reasserted on every update when requested: another gate may have
        // claimed the default flag out-of-band.
        if record.spec.default == Some(true) {
            self.api
                .set_as_default(&record.spec.name)
                .await
                .map_err(|e| Error::remote(ERR_DEFAULT_GATE, e))?;
        }

        Ok(())
    }

    async fn delete(&self, record: &mut GateRecord) -> Result<(), Error> {
        record.readiness = Some(Readiness::deleting());

        let Some(external_name) = record.external_name.clone() else {
            return Ok(());
        };

        self.api
            .destroy(&external_name)
            .await
            .map_err(|e| Error::remote(ERR_DELETE_GATE, e))?;

        Ok(())
    }
}
