use serde::{Deserialize, Serialize};

/// Rol del actor que dispara una transición
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Customer,
    Admin,
    Driver,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Customer => "customer",
            ActorRole::Admin => "admin",
            ActorRole::Driver => "driver",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(ActorRole::Customer),
            "admin" => Some(ActorRole::Admin),
            "driver" => Some(ActorRole::Driver),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identidad del actor tal como llega del API layer
///
/// La autenticación es responsabilidad de la capa externa; aquí solo
/// se usa la identidad para evaluar guards (ej: driver asignado).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: ActorRole) -> Self {
        Self { id: id.into(), role }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self::new(id, ActorRole::Admin)
    }

    pub fn driver(id: impl Into<String>) -> Self {
        Self::new(id, ActorRole::Driver)
    }

    pub fn customer(id: impl Into<String>) -> Self {
        Self::new(id, ActorRole::Customer)
    }
}
