//! Typed PokeAPI payloads with shape and constraint validation.
//!
//! The request executor never calls into this module; tests use it to turn a
//! response body into a checked value:
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use apiprobe_http::{request, schema::{self, Pokemon}, RequestOptions};
//!
//! let res = request("/pokemon/ditto", RequestOptions::new()).await?;
//! let ditto: Pokemon = schema::parse(res.json_value().await?)?;
//! assert_eq!(ditto.name, "ditto");
//! # Ok(())
//! # }
//! ```

use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

/// Payload did not match the expected schema.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Missing field, wrong type, or otherwise undecodable JSON.
    #[error("shape mismatch: {0}")]
    Shape(#[from] serde_json::Error),
    /// Field decoded but violates a value constraint.
    #[error("invalid field '{field}': {message}")]
    Constraint { field: String, message: String },
}

impl ValidationError {
    fn constraint(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Constraint {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Value constraints checked after decoding.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Decodes `payload` as `T` and checks its constraints.
pub fn parse<T>(payload: serde_json::Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_value(payload)?;
    value.validate()?;
    Ok(value)
}

fn positive(field: &str, value: i64) -> Result<(), ValidationError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ValidationError::constraint(field, format!("{value} is not positive")))
    }
}

fn non_negative(field: &str, value: i64) -> Result<(), ValidationError> {
    if value >= 0 {
        Ok(())
    } else {
        Err(ValidationError::constraint(field, format!("{value} is negative")))
    }
}

fn absolute_url(field: &str, value: &str) -> Result<(), ValidationError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|err| ValidationError::constraint(field, format!("'{value}' is not a url: {err}")))
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NamedApiResource {
    pub name: String,
    pub url: String,
}

impl Validate for NamedApiResource {
    fn validate(&self) -> Result<(), ValidationError> {
        absolute_url("url", &self.url)
    }
}

fn validate_all(field: &str, items: &[NamedApiResource]) -> Result<(), ValidationError> {
    for (index, item) in items.iter().enumerate() {
        item.validate().map_err(|err| match err {
            ValidationError::Constraint { field: inner, message } => {
                ValidationError::constraint(format!("{field}[{index}].{inner}"), message)
            }
            other => other,
        })?;
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PokemonAbility {
    pub ability: NamedApiResource,
    pub is_hidden: bool,
    pub slot: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Pokemon {
    pub id: i64,
    pub name: String,
    pub height: i64,
    pub weight: i64,
    pub abilities: Vec<PokemonAbility>,
    pub species: NamedApiResource,
    #[serde(default)]
    pub sprites: Sprites,
}

impl Validate for Pokemon {
    fn validate(&self) -> Result<(), ValidationError> {
        positive("id", self.id)?;
        non_negative("height", self.height)?;
        non_negative("weight", self.weight)?;
        if self.abilities.is_empty() {
            return Err(ValidationError::constraint("abilities", "must not be empty"));
        }
        for (index, ability) in self.abilities.iter().enumerate() {
            positive(&format!("abilities[{index}].slot"), ability.slot)?;
            absolute_url(&format!("abilities[{index}].ability.url"), &ability.ability.url)?;
        }
        absolute_url("species.url", &self.species.url)?;
        if let Some(sprite) = &self.sprites.front_default {
            absolute_url("sprites.front_default", sprite)?;
        }
        Ok(())
    }
}

/// The `id` and `name` subset of [`Pokemon`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PokemonSummary {
    pub id: i64,
    pub name: String,
}

impl Validate for PokemonSummary {
    fn validate(&self) -> Result<(), ValidationError> {
        positive("id", self.id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PaginatedList {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<NamedApiResource>,
}

impl Validate for PaginatedList {
    fn validate(&self) -> Result<(), ValidationError> {
        non_negative("count", self.count)?;
        if let Some(next) = &self.next {
            absolute_url("next", next)?;
        }
        if let Some(previous) = &self.previous {
            absolute_url("previous", previous)?;
        }
        validate_all("results", &self.results)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DamageRelations {
    pub double_damage_from: Vec<NamedApiResource>,
    pub double_damage_to: Vec<NamedApiResource>,
    pub half_damage_from: Vec<NamedApiResource>,
    pub half_damage_to: Vec<NamedApiResource>,
    pub no_damage_from: Vec<NamedApiResource>,
    pub no_damage_to: Vec<NamedApiResource>,
}

impl DamageRelations {
    /// Number of relations across all six lists.
    pub fn total(&self) -> usize {
        self.lists().iter().map(|(_, list)| list.len()).sum()
    }

    fn lists(&self) -> [(&'static str, &[NamedApiResource]); 6] {
        [
            ("double_damage_from", self.double_damage_from.as_slice()),
            ("double_damage_to", self.double_damage_to.as_slice()),
            ("half_damage_from", self.half_damage_from.as_slice()),
            ("half_damage_to", self.half_damage_to.as_slice()),
            ("no_damage_from", self.no_damage_from.as_slice()),
            ("no_damage_to", self.no_damage_to.as_slice()),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PokemonType {
    pub id: i64,
    pub name: String,
    pub damage_relations: DamageRelations,
}

impl Validate for PokemonType {
    fn validate(&self) -> Result<(), ValidationError> {
        positive("id", self.id)?;
        for (field, list) in self.damage_relations.lists() {
            validate_all(&format!("damage_relations.{field}"), list)?;
        }
        Ok(())
    }
}
