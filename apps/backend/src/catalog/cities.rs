//! City directory backed by a JSON list embedded at compile time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::geo::{haversine_km, GeoPoint};
use super::slug::is_valid_label;
use crate::errors::domain::{DomainError, InfraErrorKind};

const EMBEDDED_CITIES: &str = include_str!("cities.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// cityLabel slug, `[a-z0-9-]+`
    pub label: String,
    pub name: String,
    pub region: String,
    pub lat: f64,
    pub lon: f64,
    pub population: u64,
}

impl City {
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestCity {
    pub city: City,
    pub distance_km: f64,
}

#[derive(Debug)]
pub struct CityDirectory {
    /// Source order; nearest-city ties resolve to the earlier entry.
    cities: Vec<City>,
    by_label: HashMap<String, usize>,
    /// Indices into `cities`, population desc then name
    ranked: Vec<usize>,
}

fn corrupt(detail: String) -> DomainError {
    DomainError::infra(InfraErrorKind::DataCorruption, detail)
}

impl CityDirectory {
    pub fn load_embedded() -> Result<Self, DomainError> {
        Self::from_json(EMBEDDED_CITIES)
    }

    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        let cities: Vec<City> = serde_json::from_str(raw)
            .map_err(|e| corrupt(format!("city list is not valid JSON: {e}")))?;
        Self::from_cities(cities)
    }

    pub fn from_cities(cities: Vec<City>) -> Result<Self, DomainError> {
        let mut by_label = HashMap::with_capacity(cities.len());

        for (idx, city) in cities.iter().enumerate() {
            if !is_valid_label(&city.label) {
                return Err(corrupt(format!("invalid city label '{}'", city.label)));
            }
            if GeoPoint::new(city.lat, city.lon).is_err() {
                return Err(corrupt(format!("invalid coordinates for '{}'", city.label)));
            }
            if by_label.insert(city.label.clone(), idx).is_some() {
                return Err(corrupt(format!("duplicate city label '{}'", city.label)));
            }
        }

        let mut ranked: Vec<usize> = (0..cities.len()).collect();
        ranked.sort_by(|&a, &b| {
            cities[b]
                .population
                .cmp(&cities[a].population)
                .then_with(|| cities[a].name.cmp(&cities[b].name))
        });

        Ok(Self {
            cities,
            by_label,
            ranked,
        })
    }

    pub fn get(&self, label: &str) -> Option<&City> {
        self.by_label.get(label).map(|&idx| &self.cities[idx])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.by_label.contains_key(label)
    }

    /// Every city, most populous first.
    pub fn all(&self) -> impl Iterator<Item = &City> {
        self.ranked.iter().map(|&idx| &self.cities[idx])
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Linear haversine scan. `None` only for an empty directory.
    pub fn nearest(&self, lat: f64, lon: f64) -> Result<Option<NearestCity>, DomainError> {
        let origin = GeoPoint::new(lat, lon)?;

        let mut best: Option<(usize, f64)> = None;
        for (idx, city) in self.cities.iter().enumerate() {
            let d = haversine_km(origin, city.point());
            // Strict comparison keeps the earlier city on ties.
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((idx, d));
            }
        }

        Ok(best.map(|(idx, distance_km)| NearestCity {
            city: self.cities[idx].clone(),
            distance_km,
        }))
    }
}
