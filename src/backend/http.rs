//! HTTP backend: one endpoint, action-discriminated requests.
//!
//! Reads are `GET <base>?action=<op>&...`; the single write is a
//! form-encoded `POST` carrying `action=saveVaccination`.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::backend::{Action, ApiResponse, Backend};
use crate::config::CheckInConfig;
use crate::error::Result;
use crate::models::wire::string_or_number;
use crate::models::{
    DashboardAggregate, Registration, StaffLookupResult, VaccinationEvent,
    VaccinationHistoryRecord,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StaffRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    staff_name: String,
}

/// `Backend` implementation over reqwest
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Build a client from validated configuration
    pub fn new(config: &CheckInConfig) -> Result<Self> {
        let base_url = config.validate()?;
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL for a read action with its query parameters
    #[must_use]
    pub fn action_url(&self, action: Action, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("action", action.as_str());
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        url
    }

    async fn query<T: DeserializeOwned>(
        &self,
        action: Action,
        params: &[(&str, &str)],
    ) -> Result<ApiResponse<T>> {
        let url = self.action_url(action, params);
        debug!("GET {action}");

        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json::<ApiResponse<T>>().await?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_all_registrations(&self) -> Result<Vec<Registration>> {
        self.query::<Vec<Registration>>(Action::GetAllRegistrations, &[])
            .await?
            .into_data(Action::GetAllRegistrations)
    }

    async fn get_vaccination_history(
        &self,
        citizen_id: &str,
    ) -> Result<Vec<VaccinationHistoryRecord>> {
        self.query::<Vec<VaccinationHistoryRecord>>(
            Action::GetVaccinationHistory,
            &[("citizenId", citizen_id)],
        )
        .await?
        .into_data_or_default(Action::GetVaccinationHistory)
    }

    async fn get_staff(&self, staff_id: &str) -> Result<StaffLookupResult> {
        let record = self
            .query::<StaffRecord>(Action::GetStaff, &[("staffId", staff_id)])
            .await?
            .into_data(Action::GetStaff)?;

        Ok(StaffLookupResult::new(staff_id, record.staff_name))
    }

    async fn get_dashboard(&self) -> Result<DashboardAggregate> {
        self.query::<DashboardAggregate>(Action::GetDashboard, &[])
            .await?
            .into_data(Action::GetDashboard)
    }

    async fn save_vaccination(&self, event: &VaccinationEvent) -> Result<String> {
        let mut form = vec![("action", Action::SaveVaccination.as_str().to_string())];
        form.extend(event.form_fields());
        debug!("POST {} for {}", Action::SaveVaccination, event.citizen_id);

        let response = self
            .client
            .post(self.base_url.clone())
            .form(&form)
            .send()
            .await?
            .error_for_status()?;

        response
            .json::<ApiResponse<serde_json::Value>>()
            .await?
            .into_save_outcome()
    }
}
