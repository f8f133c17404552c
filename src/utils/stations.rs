//! Police station directory
//!
//! Reference data for the report wizard's station step. Matching is
//! case-insensitive over name, zone, location and specialization.

use lazy_static::lazy_static;

use crate::models::types::PoliceStation;

#[allow(clippy::too_many_arguments)]
fn station(
    name: &str,
    zone: &str,
    designation: &str,
    mobile: &str,
    email: &str,
    telephone: &str,
    location: &str,
    specialization: &str,
) -> PoliceStation {
    PoliceStation {
        name: name.to_string(),
        zone: zone.to_string(),
        designation: designation.to_string(),
        mobile: mobile.to_string(),
        email: email.to_string(),
        telephone: telephone.to_string(),
        location: location.to_string(),
        specialization: specialization.to_string(),
    }
}

lazy_static! {
    static ref DEFAULT_STATIONS: Vec<PoliceStation> = vec![
        station(
            "Gorakhpur Range",
            "Gorakhpur Range",
            "DIG",
            "94544002",
            "digrgkr@up.gov.in",
            "0551-2201, 0551-2200",
            "Gorakhpur, Uttar Pradesh",
            "General Law Enforcement",
        ),
        station(
            "Mumbai Cyber Cell",
            "Mumbai Metropolitan",
            "ACP",
            "98765432",
            "cybermumbai@gov.in",
            "022-2345, 022-2346",
            "Mumbai, Maharashtra",
            "Cybercrime & Digital Forensics",
        ),
        station(
            "Delhi Central District",
            "Delhi Central",
            "DCP",
            "91234567",
            "delhicentral@police.gov.in",
            "011-2301, 011-2302",
            "New Delhi, Delhi",
            "Financial Crimes & Fraud",
        ),
    ];
}

/// Searchable set of stations
#[derive(Debug, Clone)]
pub struct StationDirectory {
    stations: Vec<PoliceStation>,
}

impl Default for StationDirectory {
    fn default() -> Self {
        Self {
            stations: DEFAULT_STATIONS.clone(),
        }
    }
}

impl StationDirectory {
    /// Directory over fetched station data
    pub fn new(stations: Vec<PoliceStation>) -> Self {
        Self { stations }
    }

    pub fn all(&self) -> &[PoliceStation] {
        &self.stations
    }

    /// Stations matching `query`; a blank query returns all
    pub fn search(&self, query: &str) -> Vec<&PoliceStation> {
        let needle = query.trim().to_lowercase();
        self.stations
            .iter()
            .filter(|s| {
                needle.is_empty()
                    || [&s.name, &s.zone, &s.location, &s.specialization]
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Exact (case-insensitive) name lookup
    pub fn by_name(&self, name: &str) -> Option<&PoliceStation> {
        let name = name.trim();
        self.stations.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }
}
