// Device and environment variable endpoints

use tracing::debug;

use crate::client::NotehubClient;
use crate::error::{Error, Scope};
use crate::models::{DevicesResponse, EnvVarsEnvelope, NotehubDevice, NotehubEnvVars};

impl NotehubClient {
    /// Fetch a single device.
    ///
    /// `GET /v1/projects/{project}/devices/{device}`
    pub async fn get_device(&self, device_uid: &str) -> Result<NotehubDevice, Error> {
        let url = self.device_url(device_uid, "")?;
        self.get(url, Scope::Device(device_uid)).await
    }

    /// List every device in the project.
    ///
    /// `GET /v1/projects/{project}/devices?pageNum={n}`, following
    /// `has_more` until the last page.
    pub async fn get_devices(&self) -> Result<Vec<NotehubDevice>, Error> {
        let mut devices = Vec::new();
        let mut page = 1_u32;
        loop {
            let mut url = self.project_url("devices")?;
            url.query_pairs_mut()
                .append_pair("pageNum", &page.to_string());
            let resp: DevicesResponse = self.get(url, Scope::Project).await?;
            devices.extend(resp.devices);
            if !resp.has_more {
                break;
            }
            page += 1;
        }
        debug!(count = devices.len(), "listed devices");
        Ok(devices)
    }

    /// Fetch a device's environment variables.
    ///
    /// `GET /v1/projects/{project}/devices/{device}/environment_variables`
    pub async fn get_environment_variables(
        &self,
        device_uid: &str,
    ) -> Result<NotehubEnvVars, Error> {
        let url = self.device_url(device_uid, "/environment_variables")?;
        let envelope: EnvVarsEnvelope = self.get(url, Scope::Device(device_uid)).await?;
        Ok(envelope.environment_variables)
    }

    /// Replace the given environment variables on a device.
    ///
    /// `PUT /v1/projects/{project}/devices/{device}/environment_variables`
    pub async fn set_environment_variables(
        &self,
        device_uid: &str,
        vars: NotehubEnvVars,
    ) -> Result<bool, Error> {
        let url = self.device_url(device_uid, "/environment_variables")?;
        debug!(device_uid, count = vars.len(), "setting environment variables");
        let body = EnvVarsEnvelope {
            environment_variables: vars,
        };
        self.put_no_response(url, &body, Scope::Device(device_uid))
            .await?;
        Ok(true)
    }
}
