//! Plan features

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::access::{AccessError, Plan};

/// A capability gated by subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Point of sale
    Ventas,
    /// Product catalogue
    Productos,
    /// Client accounts
    Clientes,
    /// Quotes
    Presupuestos,
    /// Electronic invoicing
    Facturacion,
    /// Mercado Pago payments
    Mercadopago,
    /// Third-party integrations
    Integraciones,
    /// Public API
    Api,
    /// Advanced reporting
    ReportesAvanzados,
}

const EMPRENDEDOR: &[Feature] = &[
    Feature::Ventas,
    Feature::Productos,
    Feature::Clientes,
    Feature::Presupuestos,
];

const COMERCIOS: &[Feature] = &[
    Feature::Ventas,
    Feature::Productos,
    Feature::Clientes,
    Feature::Presupuestos,
    Feature::Facturacion,
    Feature::Mercadopago,
];

const PYMES: &[Feature] = &[
    Feature::Ventas,
    Feature::Productos,
    Feature::Clientes,
    Feature::Presupuestos,
    Feature::Facturacion,
    Feature::Mercadopago,
    Feature::Integraciones,
    Feature::Api,
    Feature::ReportesAvanzados,
];

impl Feature {
    /// Every feature.
    pub const ALL: [Feature; 9] = [
        Feature::Ventas,
        Feature::Productos,
        Feature::Clientes,
        Feature::Presupuestos,
        Feature::Facturacion,
        Feature::Mercadopago,
        Feature::Integraciones,
        Feature::Api,
        Feature::ReportesAvanzados,
    ];

    /// Wire name of the feature.
    pub const fn as_str(self) -> &'static str {
        match self {
            Feature::Ventas => "ventas",
            Feature::Productos => "productos",
            Feature::Clientes => "clientes",
            Feature::Presupuestos => "presupuestos",
            Feature::Facturacion => "facturacion",
            Feature::Mercadopago => "mercadopago",
            Feature::Integraciones => "integraciones",
            Feature::Api => "api",
            Feature::ReportesAvanzados => "reportes_avanzados",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| AccessError::UnknownFeature(s.to_string()))
    }
}

/// Features included in `plan`.
pub fn plan_features(plan: Plan) -> &'static [Feature] {
    match plan {
        Plan::Emprendedor => EMPRENDEDOR,
        Plan::Comercios => COMERCIOS,
        Plan::Pymes => PYMES,
    }
}

/// Plans that include `feature`, from the entry tier upwards.
pub fn plans_including(feature: Feature) -> SmallVec<[Plan; 3]> {
    Plan::ALL
        .into_iter()
        .filter(|plan| plan.includes(feature))
        .collect()
}
