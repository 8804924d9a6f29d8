//! Health records and the auxiliary data providers the suggestion flow draws on.

mod file;
mod sample;

pub use file::JsonFileHealthData;
pub use sample::SampleHealthData;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// e.g. "120/80"
    pub blood_pressure: String,
    /// g/dL
    pub hemoglobin: f64,
    pub bmi: f64,
    /// kg
    pub weight: f64,
    /// mg/dL
    pub glucose: f64,
    /// BPM, from a wearable when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_month_report: Option<MonthlySnapshot>,
    #[serde(default)]
    pub historical_data: Vec<HistoricalDataPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySnapshot {
    pub blood_pressure: String,
    pub hemoglobin: f64,
    pub bmi: f64,
    pub weight: f64,
    pub glucose: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDataPoint {
    /// Short month name, e.g. "Mar"
    pub month: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glucose: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bp_systolic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bp_diastolic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hemoglobin: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub date: String,
    pub time: String,
    pub doctor_name: String,
    pub doctor_speciality: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinationRecord {
    pub vaccine: String,
    pub due_date: String,
    /// e.g. "Completed", "Due", "Scheduled"
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medicine {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

/// Source of the user's tracked health data.
///
/// Each call is independent; a failure means that piece of data is unavailable.
#[async_trait]
pub trait HealthDataProvider: Send + Sync {
    async fn health_report(&self) -> Result<HealthReport>;
    async fn appointments(&self) -> Result<Vec<Appointment>>;
    async fn vaccination_schedule(&self) -> Result<Vec<VaccinationRecord>>;
    async fn medicines(&self) -> Result<Vec<Medicine>>;
}

/// Whatever auxiliary data could be fetched for one flow invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_report: Option<HealthReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointments: Option<Vec<Appointment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vaccination_schedule: Option<Vec<VaccinationRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medicines: Option<Vec<Medicine>>,
}

/// Fetch all four records concurrently.
///
/// Failed fetches are logged and left absent; this never fails as a whole.
pub async fn gather_context(provider: &dyn HealthDataProvider) -> HealthContext {
    let (health_report, appointments, vaccination_schedule, medicines) = futures::join!(
        provider.health_report(),
        provider.appointments(),
        provider.vaccination_schedule(),
        provider.medicines(),
    );

    let context = HealthContext {
        health_report: available("health_report", health_report),
        appointments: available("appointments", appointments),
        vaccination_schedule: available("vaccination_schedule", vaccination_schedule),
        medicines: available("medicines", medicines),
    };
    debug!(
        health_report = context.health_report.is_some(),
        appointments = context.appointments.as_ref().map_or(0, Vec::len),
        vaccinations = context.vaccination_schedule.as_ref().map_or(0, Vec::len),
        medicines = context.medicines.as_ref().map_or(0, Vec::len),
        "Gathered health context"
    );
    context
}

fn available<T>(provider: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(provider, error = %e, "Health data unavailable, continuing without it");
            None
        }
    }
}
