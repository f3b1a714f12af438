//! Patient models and name search.

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

/// Minimum Jaro-Winkler similarity for a misspelled name to still match.
pub const FUZZY_NAME_THRESHOLD: f64 = 0.88;

/// A patient record from `/api/patients/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Server ID
    pub id: u64,
    /// Clinic-assigned patient code
    #[serde(default)]
    pub patient_code: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    /// National ID number
    #[serde(default)]
    pub tc_no: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub blood_type: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: String,
    /// Present on the detail endpoint only
    #[serde(default)]
    pub visits: Vec<VisitSummary>,
}

/// Visit row embedded in a patient detail response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitSummary {
    pub id: u64,
    pub visit_date: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub document: Option<String>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Editable patient fields, for create (`POST`) and update (`PUT`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientForm {
    pub patient_code: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub tc_no: String,
    pub city: String,
    pub district: String,
    pub address: String,
    pub blood_type: String,
    pub allergies: String,
    pub notes: String,
}

impl From<&Patient> for PatientForm {
    fn from(p: &Patient) -> Self {
        Self {
            patient_code: p.patient_code.clone(),
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            birth_date: p.birth_date.clone().unwrap_or_default(),
            gender: p.gender.clone(),
            phone: p.phone.clone(),
            email: p.email.clone(),
            tc_no: p.tc_no.clone(),
            city: p.city.clone(),
            district: p.district.clone(),
            address: p.address.clone(),
            blood_type: p.blood_type.clone(),
            allergies: p.allergies.clone(),
            notes: p.notes.clone(),
        }
    }
}

/// Filter patients by name.
///
/// An empty query returns everyone. Otherwise names containing the query
/// (case-insensitive) come first, in list order, followed by close
/// misspellings ranked by similarity.
pub fn search_patients<'a>(patients: &'a [Patient], query: &str) -> Vec<&'a Patient> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return patients.iter().collect();
    }

    let mut hits = Vec::new();
    let mut near: Vec<(f64, &Patient)> = Vec::new();

    for patient in patients {
        let name = patient.full_name().to_lowercase();
        if name.contains(&query) {
            hits.push(patient);
            continue;
        }
        let score = name_similarity(&name, &query);
        if score >= FUZZY_NAME_THRESHOLD {
            near.push((score, patient));
        }
    }

    near.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    hits.extend(near.into_iter().map(|(_, p)| p));
    hits
}

/// Best similarity of the query against the whole name or any single word.
fn name_similarity(name: &str, query: &str) -> f64 {
    name.split_whitespace()
        .map(|token| jaro_winkler(token, query))
        .fold(jaro_winkler(name, query), f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: u64, first: &str, last: &str) -> Patient {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "first_name": first,
            "last_name": last,
        }))
        .unwrap()
    }

    fn roster() -> Vec<Patient> {
        vec![
            patient(1, "Ayşe", "Yılmaz"),
            patient(2, "Mehmet", "Demir"),
            patient(3, "Zeynep", "Kaya"),
            patient(4, "Ali", "Mehmetoğlu"),
        ]
    }

    #[test]
    fn test_empty_query_returns_all() {
        let patients = roster();
        assert_eq!(search_patients(&patients, "  ").len(), 4);
    }

    #[test]
    fn test_substring_is_case_insensitive() {
        let patients = roster();
        let ids: Vec<u64> = search_patients(&patients, "MEHMET").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_misspelling_still_matches() {
        let patients = roster();
        let ids: Vec<u64> = search_patients(&patients, "mehmt").iter().map(|p| p.id).collect();
        assert!(ids.contains(&2));
        assert!(!ids.contains(&3));
    }

    #[test]
    fn test_form_from_patient() {
        let mut p = patient(7, "Elif", "Şahin");
        p.birth_date = Some("1990-01-01".into());
        let form = PatientForm::from(&p);
        assert_eq!(form.first_name, "Elif");
        assert_eq!(form.birth_date, "1990-01-01");
    }
}
