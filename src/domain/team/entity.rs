//! Team entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::validation::{validate_photo_ref, validate_team_id, TeamValidationError};
use crate::domain::auth::ActorId;
use crate::domain::fields::{
    number_field, seconds_to_timestamp, text_field, timestamp_to_seconds, FieldMap,
};

/// Document field names as stored in the `teams` collection
pub mod field {
    pub const NAME: &str = "teamName";
    pub const ORGANIZATION: &str = "university";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const PROJECT_NAME: &str = "projectName";
    pub const PROJECT_DESCRIPTION: &str = "projectDescription";
    pub const PHOTO_REF: &str = "appImageUUID";
    pub const CREATED_ON: &str = "createdOn";
    pub const OWNER_ID: &str = "postingUserID";
}

/// Store-assigned team identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TeamId(String);

impl TeamId {
    /// Create a new TeamId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, TeamValidationError> {
        let id = id.into();
        validate_team_id(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TeamId {
    type Error = TeamValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TeamId> for String {
    fn from(id: TeamId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference joining a team to its photo in the blob store
///
/// Namespaced under the owning team's id, so two teams may carry the same
/// reference string without colliding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhotoRef(String);

impl PhotoRef {
    pub fn new(reference: impl Into<String>) -> Result<Self, TeamValidationError> {
        let reference = reference.into();
        validate_photo_ref(&reference)?;
        Ok(Self(reference))
    }

    /// Mint a fresh, unique reference
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhotoRef {
    type Error = TeamValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhotoRef> for String {
    fn from(reference: PhotoRef) -> Self {
        reference.0
    }
}

impl std::fmt::Display for PhotoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Team record
///
/// Serialized as a flat field map. The id lives in the store's addressing
/// layer and is never part of the map; the photo itself is never embedded,
/// only its reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    id: Option<TeamId>,
    name: String,
    organization: String,
    location: Coordinate,
    project_name: String,
    project_description: String,
    photo_ref: Option<PhotoRef>,
    /// Seconds since the Unix epoch, exactly as stored
    created_on: f64,
    owner_id: Option<ActorId>,
}

impl Default for Team {
    fn default() -> Self {
        Self::new()
    }
}

impl Team {
    /// Create an empty, not yet persisted team stamped with the current time
    pub fn new() -> Self {
        Self {
            id: None,
            name: String::new(),
            organization: String::new(),
            location: Coordinate::default(),
            project_name: String::new(),
            project_description: String::new(),
            photo_ref: None,
            created_on: timestamp_to_seconds(Utc::now()),
            owner_id: None,
        }
    }

    /// Decode a team from a stored field map
    ///
    /// Never fails: absent or mistyped fields become empty strings, zero
    /// coordinates or the Unix epoch. Empty photo references and owner ids
    /// decode to `None`; any other text is kept verbatim. The id is left unset.
    pub fn from_fields(fields: &FieldMap) -> Self {
        let photo_ref = PhotoRef::new(text_field(fields, field::PHOTO_REF)).ok();
        let owner_id = Some(text_field(fields, field::OWNER_ID))
            .filter(|owner| !owner.is_empty())
            .map(ActorId::new);

        Self {
            id: None,
            name: text_field(fields, field::NAME),
            organization: text_field(fields, field::ORGANIZATION),
            location: Coordinate::new(
                number_field(fields, field::LATITUDE),
                number_field(fields, field::LONGITUDE),
            ),
            project_name: text_field(fields, field::PROJECT_NAME),
            project_description: text_field(fields, field::PROJECT_DESCRIPTION),
            photo_ref,
            created_on: number_field(fields, field::CREATED_ON),
            owner_id,
        }
    }

    /// Decode a team delivered by the store together with its id
    pub fn from_document(id: TeamId, fields: &FieldMap) -> Self {
        let mut team = Self::from_fields(fields);
        team.id = Some(id);
        team
    }

    /// Project every persisted attribute into a flat field map
    pub fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert(field::NAME.into(), Value::from(self.name.as_str()));
        fields.insert(
            field::ORGANIZATION.into(),
            Value::from(self.organization.as_str()),
        );
        fields.insert(field::LATITUDE.into(), Value::from(self.location.latitude));
        fields.insert(field::LONGITUDE.into(), Value::from(self.location.longitude));
        fields.insert(
            field::PROJECT_NAME.into(),
            Value::from(self.project_name.as_str()),
        );
        fields.insert(
            field::PROJECT_DESCRIPTION.into(),
            Value::from(self.project_description.as_str()),
        );
        fields.insert(
            field::PHOTO_REF.into(),
            Value::from(self.photo_ref.as_ref().map(PhotoRef::as_str).unwrap_or("")),
        );
        fields.insert(
            field::CREATED_ON.into(),
            Value::from(self.created_on),
        );
        fields.insert(
            field::OWNER_ID.into(),
            Value::from(self.owner_id.as_ref().map(ActorId::as_str).unwrap_or("")),
        );
        fields
    }

    // Builders

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Coordinate::new(latitude, longitude);
        self
    }

    pub fn with_project(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.project_name = name.into();
        self.project_description = description.into();
        self
    }

    pub fn with_created_on(mut self, created_on: DateTime<Utc>) -> Self {
        self.created_on = timestamp_to_seconds(created_on);
        self
    }

    pub fn with_photo_ref(mut self, photo_ref: PhotoRef) -> Self {
        self.photo_ref = Some(photo_ref);
        self
    }

    // Getters

    pub fn id(&self) -> Option<&TeamId> {
        self.id.as_ref()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn location(&self) -> Coordinate {
        self.location
    }

    pub fn latitude(&self) -> f64 {
        self.location.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.location.longitude
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn project_description(&self) -> &str {
        &self.project_description
    }

    pub fn photo_ref(&self) -> Option<&PhotoRef> {
        self.photo_ref.as_ref()
    }

    /// Creation time; seconds outside the representable range map to the epoch
    pub fn created_on(&self) -> DateTime<Utc> {
        seconds_to_timestamp(self.created_on)
    }

    /// Creation time as stored: seconds since the Unix epoch
    pub fn created_on_seconds(&self) -> f64 {
        self.created_on
    }

    pub fn owner_id(&self) -> Option<&ActorId> {
        self.owner_id.as_ref()
    }

    /// Map annotation title
    pub fn title(&self) -> &str {
        &self.name
    }

    /// Map annotation subtitle
    pub fn subtitle(&self) -> &str {
        &self.organization
    }

    // Mutators

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_organization(&mut self, organization: impl Into<String>) {
        self.organization = organization.into();
    }

    pub fn set_location(&mut self, location: Coordinate) {
        self.location = location;
    }

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.project_name = name.into();
    }

    pub fn set_project_description(&mut self, description: impl Into<String>) {
        self.project_description = description.into();
    }

    /// Replace the photo reference explicitly
    pub fn set_photo_ref(&mut self, photo_ref: Option<PhotoRef>) {
        self.photo_ref = photo_ref;
    }

    /// Adopt the id the store assigned on first persist
    ///
    /// An id, once set, is never replaced.
    pub(crate) fn adopt_id(&mut self, id: TeamId) {
        if self.id.is_none() {
            self.id = Some(id);
        }
    }

    pub(crate) fn stamp_owner(&mut self, owner: ActorId) {
        self.owner_id = Some(owner);
    }

    /// Return the photo reference, minting one first if none is assigned
    pub(crate) fn ensure_photo_ref(&mut self) -> PhotoRef {
        self.photo_ref.get_or_insert_with(PhotoRef::generate).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn full_fields() -> FieldMap {
        fields(json!({
            "teamName": "Alpha",
            "university": "Tech U",
            "latitude": 42.33,
            "longitude": -71.17,
            "projectName": "X",
            "projectDescription": "Y",
            "appImageUUID": "9F2C4A0E-7B1D-4C55-9E0A-3F1B2C3D4E5F",
            "createdOn": 1_595_260_800.5,
            "postingUserID": "u1"
        }))
    }

    #[test]
    fn test_team_id_valid() {
        let id = TeamId::new("a1B2c3D4e5F6g7H8i9J0").unwrap();
        assert_eq!(id.as_str(), "a1B2c3D4e5F6g7H8i9J0");
    }

    #[test]
    fn test_team_id_invalid() {
        assert!(TeamId::new("").is_err());
        assert!(TeamId::new("a/b").is_err());
    }

    #[test]
    fn test_photo_ref_generate_is_unique() {
        let first = PhotoRef::generate();
        let second = PhotoRef::generate();

        assert_ne!(first, second);
        assert_eq!(first.as_str(), first.as_str().to_uppercase());
    }

    #[test]
    fn test_new_team_is_empty() {
        let team = Team::new();

        assert!(team.id().is_none());
        assert!(!team.is_persisted());
        assert_eq!(team.name(), "");
        assert_eq!(team.organization(), "");
        assert_eq!(team.location(), Coordinate::default());
        assert!(team.photo_ref().is_none());
        assert!(team.owner_id().is_none());
    }

    #[test]
    fn test_from_fields_reads_every_field() {
        let team = Team::from_fields(&full_fields());

        assert_eq!(team.name(), "Alpha");
        assert_eq!(team.organization(), "Tech U");
        assert_eq!(team.latitude(), 42.33);
        assert_eq!(team.longitude(), -71.17);
        assert_eq!(team.project_name(), "X");
        assert_eq!(team.project_description(), "Y");
        assert_eq!(
            team.photo_ref().map(PhotoRef::as_str),
            Some("9F2C4A0E-7B1D-4C55-9E0A-3F1B2C3D4E5F")
        );
        assert_eq!(team.created_on().timestamp(), 1_595_260_800);
        assert_eq!(team.owner_id().map(ActorId::as_str), Some("u1"));
        assert!(team.id().is_none());
    }

    #[test]
    fn test_from_fields_round_trip() {
        let original = full_fields();
        let decoded = Team::from_fields(&original).to_fields();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_from_fields_defaults_for_missing_fields() {
        let team = Team::from_fields(&fields(json!({"teamName": "Alpha"})));
        let out = team.to_fields();

        assert_eq!(out["teamName"], json!("Alpha"));
        assert_eq!(out["university"], json!(""));
        assert_eq!(out["latitude"], json!(0.0));
        assert_eq!(out["longitude"], json!(0.0));
        assert_eq!(out["projectName"], json!(""));
        assert_eq!(out["projectDescription"], json!(""));
        assert_eq!(out["appImageUUID"], json!(""));
        assert_eq!(out["createdOn"], json!(0.0));
        assert_eq!(out["postingUserID"], json!(""));
        assert_eq!(out.len(), 9);
    }

    #[test]
    fn test_from_fields_tolerates_mistyped_fields() {
        let team = Team::from_fields(&fields(json!({
            "teamName": 12,
            "latitude": "north",
            "createdOn": "yesterday",
            "appImageUUID": null,
            "postingUserID": ["u1"]
        })));

        assert_eq!(team.name(), "");
        assert_eq!(team.latitude(), 0.0);
        assert_eq!(team.created_on().timestamp(), 0);
        assert!(team.photo_ref().is_none());
        assert!(team.owner_id().is_none());
    }

    #[test]
    fn test_to_fields_never_contains_id() {
        let id = TeamId::new("doc-1").unwrap();
        let team = Team::from_document(id, &full_fields());

        assert_eq!(team.id().map(TeamId::as_str), Some("doc-1"));
        assert!(!team.to_fields().contains_key("documentID"));
        assert!(team.to_fields().values().all(|v| !v.is_object() && !v.is_array()));
    }

    #[test]
    fn test_title_and_subtitle() {
        let team = Team::new().with_name("Alpha").with_organization("Tech U");

        assert_eq!(team.title(), "Alpha");
        assert_eq!(team.subtitle(), "Tech U");
    }

    #[test]
    fn test_adopt_id_only_once() {
        let mut team = Team::new();
        team.adopt_id(TeamId::new("first").unwrap());
        team.adopt_id(TeamId::new("second").unwrap());

        assert_eq!(team.id().map(TeamId::as_str), Some("first"));
    }

    #[test]
    fn test_ensure_photo_ref_is_stable() {
        let mut team = Team::new();
        let minted = team.ensure_photo_ref();

        assert_eq!(team.ensure_photo_ref(), minted);
        assert_eq!(team.photo_ref(), Some(&minted));
    }

    #[test]
    fn test_setters() {
        let mut team = Team::new();
        team.set_name("Beta");
        team.set_organization("State U");
        team.set_location(Coordinate::new(1.5, 2.5));
        team.set_project_name("P");
        team.set_project_description("D");

        assert_eq!(team.name(), "Beta");
        assert_eq!(team.organization(), "State U");
        assert_eq!(team.latitude(), 1.5);
        assert_eq!(team.longitude(), 2.5);
        assert_eq!(team.project_name(), "P");
        assert_eq!(team.project_description(), "D");
    }

    #[test]
    fn test_round_trip_keeps_edge_case_values() {
        let cases = [
            ("appImageUUID", json!("a/b")),
            ("appImageUUID", json!("..")),
            ("appImageUUID", json!("back\\slash")),
            ("appImageUUID", json!("x".repeat(300))),
            ("createdOn", json!(1_595_260_800.123_456_7)),
            ("createdOn", json!(-62_135_596_800.25)),
            ("createdOn", json!(1.0e300)),
            ("createdOn", json!(-1.0e300)),
            ("postingUserID", json!("user with spaces")),
        ];

        for (key, value) in cases {
            let mut input = full_fields();
            input.insert(key.to_string(), value.clone());

            let output = Team::from_fields(&input).to_fields();
            assert_eq!(output[key], value, "{key} = {value} was not reproduced");
            assert_eq!(output, input);
        }
    }

    #[test]
    fn test_out_of_range_created_on_reads_as_epoch() {
        let team = Team::from_fields(&fields(json!({"createdOn": 1.0e300})));

        assert_eq!(team.created_on_seconds(), 1.0e300);
        assert_eq!(team.created_on().timestamp(), 0);
    }

    #[test]
    fn test_mistyped_fields_decode_to_defaults_on_round_trip() {
        let output = Team::from_fields(&fields(json!({
            "appImageUUID": 42,
            "createdOn": "2020-07-20",
        })))
        .to_fields();

        assert_eq!(output["appImageUUID"], json!(""));
        assert_eq!(output["createdOn"], json!(0.0));
    }
}
