use super::{Appointment, HealthDataProvider, HealthReport, Medicine, VaccinationRecord};
use crate::error::{NavarahError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;

/// Health records read from a JSON document on each request.
///
/// The document is an object with optional `health_report`, `appointments`,
/// `vaccination_schedule` and `medicines` keys. A missing key or an
/// unreadable file makes that record unavailable.
#[derive(Debug, Clone)]
pub struct JsonFileHealthData {
    path: PathBuf,
}

impl JsonFileHealthData {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileHealthData { path: path.into() }
    }

    async fn section<T: DeserializeOwned>(&self, key: &'static str) -> Result<T> {
        let unavailable = |reason: String| NavarahError::ProviderUnavailable {
            provider: key,
            reason,
        };

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| unavailable(format!("{}: {}", self.path.display(), e)))?;
        let mut document: Value = serde_json::from_str(&content)
            .map_err(|e| unavailable(format!("{}: {}", self.path.display(), e)))?;

        let section = document
            .get_mut(key)
            .map(Value::take)
            .filter(|v| !v.is_null())
            .ok_or_else(|| unavailable(format!("no '{}' entry in {}", key, self.path.display())))?;

        serde_json::from_value(section).map_err(|e| unavailable(format!("malformed '{}': {}", key, e)))
    }
}

#[async_trait]
impl HealthDataProvider for JsonFileHealthData {
    async fn health_report(&self) -> Result<HealthReport> {
        self.section("health_report").await
    }

    async fn appointments(&self) -> Result<Vec<Appointment>> {
        self.section("appointments").await
    }

    async fn vaccination_schedule(&self) -> Result<Vec<VaccinationRecord>> {
        self.section("vaccination_schedule").await
    }

    async fn medicines(&self) -> Result<Vec<Medicine>> {
        self.section("medicines").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::gather_context;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_present_sections_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "medicines": [{{"name": "Iron Supplement", "dosage": "60 mg", "frequency": "Once Daily"}}],
                "appointments": [],
                "health_report": {{"blood_pressure": "bad"}}
            }}"#
        )
        .unwrap();

        let provider = JsonFileHealthData::new(file.path());
        let context = gather_context(&provider).await;

        assert_eq!(context.medicines.as_ref().map(Vec::len), Some(1));
        assert_eq!(context.appointments, Some(vec![]));
        // malformed and missing sections degrade to absent
        assert!(context.health_report.is_none());
        assert!(context.vaccination_schedule.is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let provider = JsonFileHealthData::new("/nonexistent/navarah/health.json");
        let err = provider.medicines().await.unwrap_err();
        assert!(matches!(
            err,
            NavarahError::ProviderUnavailable { provider: "medicines", .. }
        ));
    }
}
