// Event endpoints
//
// Latest events per device, and the project-wide event history used by
// bulk import.

use tracing::debug;

use crate::client::NotehubClient;
use crate::error::{Error, Scope};
use crate::models::{EventsResponse, LatestEvents, RoutedEvent};

impl NotehubClient {
    /// The most recent event of each notefile on a device.
    ///
    /// `GET /v1/projects/{project}/devices/{device}/latest`
    pub async fn get_latest_events(&self, device_uid: &str) -> Result<LatestEvents, Error> {
        let url = self.device_url(device_uid, "/latest")?;
        self.get(url, Scope::Device(device_uid)).await
    }

    /// All project events since `start_date` (whole epoch seconds).
    ///
    /// `GET /v1/projects/{project}/events?startDate={start_date}&pageNum={n}`,
    /// following `has_more` until the last page.
    pub async fn get_events(&self, start_date: &str) -> Result<Vec<RoutedEvent>, Error> {
        let mut events = Vec::new();
        let mut page = 1_u32;
        loop {
            let mut url = self.project_url("events")?;
            url.query_pairs_mut()
                .append_pair("startDate", start_date)
                .append_pair("pageNum", &page.to_string());
            let resp: EventsResponse = self.get(url, Scope::Project).await?;
            events.extend(resp.events);
            if !resp.has_more {
                break;
            }
            page += 1;
        }
        debug!(start_date, count = events.len(), "listed project events");
        Ok(events)
    }
}
