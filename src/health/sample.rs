use super::{
    Appointment, HealthDataProvider, HealthReport, HistoricalDataPoint, Medicine, MonthlySnapshot,
    VaccinationRecord,
};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{Datelike, Duration, Local};

/// Bundled demonstration records, standing in for a real health-record API
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleHealthData;

fn point(month: &str, weight: f64, glucose: f64, sys: f64, dia: f64, bmi: f64, hb: f64) -> HistoricalDataPoint {
    HistoricalDataPoint {
        month: month.to_string(),
        weight: Some(weight),
        glucose: Some(glucose),
        bp_systolic: Some(sys),
        bp_diastolic: Some(dia),
        bmi: Some(bmi),
        hemoglobin: Some(hb),
    }
}

fn appointment(date: String, time: &str, doctor: &str, speciality: &str) -> Appointment {
    Appointment {
        date,
        time: time.to_string(),
        doctor_name: doctor.to_string(),
        doctor_speciality: speciality.to_string(),
    }
}

fn vaccine(name: &str, due: &str, status: &str) -> VaccinationRecord {
    VaccinationRecord {
        vaccine: name.to_string(),
        due_date: due.to_string(),
        status: status.to_string(),
    }
}

fn medicine(name: &str, dosage: &str, frequency: &str) -> Medicine {
    Medicine {
        name: name.to_string(),
        dosage: dosage.to_string(),
        frequency: frequency.to_string(),
    }
}

#[async_trait]
impl HealthDataProvider for SampleHealthData {
    async fn health_report(&self) -> Result<HealthReport> {
        Ok(HealthReport {
            blood_pressure: "120/80".to_string(),
            hemoglobin: 12.5,
            bmi: 22.5,
            weight: 65.0,
            glucose: 95.0,
            heart_rate: Some(72.0),
            previous_month_report: Some(MonthlySnapshot {
                blood_pressure: "118/78".to_string(),
                hemoglobin: 12.8,
                bmi: 22.1,
                weight: 64.0,
                glucose: 92.0,
            }),
            historical_data: vec![
                point("Mar", 62.0, 88.0, 115.0, 75.0, 21.5, 13.0),
                point("Apr", 63.0, 90.0, 116.0, 76.0, 21.8, 12.9),
                point("May", 64.0, 92.0, 118.0, 78.0, 22.1, 12.8),
                point("Jun", 65.0, 95.0, 120.0, 80.0, 22.5, 12.5),
            ],
        })
    }

    /// Past visits plus upcoming ones relative to today
    async fn appointments(&self) -> Result<Vec<Appointment>> {
        let today = Local::now().date_naive();
        let fmt = |d: chrono::NaiveDate| d.format("%Y-%m-%d").to_string();
        let year = today.year();
        let next_year = year + 1;

        Ok(vec![
            appointment("2024-03-15".to_string(), "10:00", "Dr. Smith", "Gynaecologist"),
            appointment("2024-03-22".to_string(), "14:00", "Dr. Jones", "Pediatrician"),
            appointment("2024-05-20".to_string(), "15:00", "Dr. Smith", "Gynaecologist"),
            appointment("2024-06-18".to_string(), "13:15", "Dr. Jones", "Pediatrician"),
            appointment("2024-07-25".to_string(), "11:00", "Dr. Lee", "Nutritionist"),
            appointment(fmt(today + Duration::days(1)), "09:30", "Dr. Miller", "Gynaecologist"),
            appointment(fmt(today + Duration::days(7)), "14:45", "Dr. Davis", "Sonographer"),
            appointment(format!("{}-10-15", year), "11:30", "Dr. Garcia", "Pediatrician"),
            appointment(format!("{}-11-01", year), "14:45", "Dr. Davis", "Sonographer"),
            appointment(format!("{}-01-20", next_year), "09:00", "Dr. Garcia", "Pediatrician"),
            appointment(format!("{}-03-05", next_year), "10:15", "Dr. Rodriguez", "Lactation Consultant"),
        ])
    }

    async fn vaccination_schedule(&self) -> Result<Vec<VaccinationRecord>> {
        Ok(vec![
            vaccine("BCG", "2024-03-10", "Completed"),
            vaccine("Hepatitis B (Birth)", "2024-03-10", "Completed"),
            vaccine("OPV (Birth)", "2024-03-10", "Completed"),
            vaccine("OPV (6 Weeks)", "2024-04-21", "Due"),
            vaccine("Pentavalent (6 Weeks)", "2024-04-21", "Due"),
            vaccine("Rotavirus (6 Weeks)", "2024-04-21", "Due"),
            vaccine("PCV (6 Weeks)", "2024-04-21", "Due"),
            vaccine("IPV (6 Weeks)", "2024-04-21", "Scheduled"),
            vaccine("OPV (10 Weeks)", "2024-05-19", "Scheduled"),
            vaccine("Pentavalent (10 Weeks)", "2024-05-19", "Scheduled"),
            vaccine("Rotavirus (10 Weeks)", "2024-05-19", "Scheduled"),
        ])
    }

    async fn medicines(&self) -> Result<Vec<Medicine>> {
        Ok(vec![
            medicine("Prenatal Vitamins", "1 tablet", "Once Daily"),
            medicine("Iron Supplement", "60 mg", "Once Daily"),
            medicine("Folic Acid", "800 mcg", "Once Daily"),
            medicine("Calcium + Vitamin D", "500mg / 400 IU", "Twice Daily"),
        ])
    }
}
