// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

//! Multi-step player profile editor.
//!
//! A [`PlayerForm`] holds an in-memory draft of one player profile and the
//! step the editor is on. Moving forward from a validated step persists that
//! step's fields; `save` validates everything and persists the whole draft.

pub mod validation;

pub use validation::{validate_personal, validate_sports, FieldErrors};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::geo;
use crate::metrics::{outcome, PLAYER_WRITES};
use crate::models::player::{OfficialContact, VideoRef};
use crate::models::{OrganizationKind, PlayerProfile};
use crate::notify::{notify_quietly, AdminNotifier, VideoNotice};
use crate::store::{collections, merge_fields, non_empty_str, to_fields, DocumentStore, Fields, StoreError};

/// Message shown when a write to the store fails
pub const SAVE_FAILED: &str = "حدث خطأ في حفظ البيانات";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Personal,
    Education,
    Medical,
    Sports,
    Skills,
    Objectives,
    Media,
    Contracts,
}

impl Step {
    pub const ALL: [Step; 8] = [
        Step::Personal,
        Step::Education,
        Step::Medical,
        Step::Sports,
        Step::Skills,
        Step::Objectives,
        Step::Media,
        Step::Contracts,
    ];

    pub const LAST: Step = Step::Contracts;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Personal => "personal",
            Step::Education => "education",
            Step::Medical => "medical",
            Step::Sports => "sports",
            Step::Skills => "skills",
            Step::Objectives => "objectives",
            Step::Media => "media",
            Step::Contracts => "contracts",
        }
    }

    /// Only the personal and sports steps gate navigation
    pub fn is_validated(self) -> bool {
        matches!(self, Step::Personal | Step::Sports)
    }

    /// Profile fields edited on this step
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Step::Personal => &[
                "full_name",
                "birth_date",
                "nationality",
                "country",
                "city",
                "phone",
                "whatsapp",
                "email",
                "brief",
                "address",
            ],
            Step::Education => &[
                "education_level",
                "graduation_year",
                "degree",
                "english_level",
                "arabic_level",
                "spanish_level",
                "training_courses",
            ],
            Step::Medical => &[
                "blood_type",
                "height",
                "weight",
                "chronic_conditions",
                "chronic_details",
                "allergies",
                "medical_notes",
                "injuries",
                "surgeries",
            ],
            Step::Sports => &[
                "primary_position",
                "secondary_position",
                "preferred_foot",
                "experience_years",
                "sports_notes",
                "club_history",
                "contract_history",
                "agent_history",
            ],
            Step::Skills => &["technical_skills", "physical_skills", "social_skills"],
            Step::Objectives => &["objectives"],
            Step::Media => &["profile_image_url", "additional_images", "videos", "documents"],
            Step::Contracts => &[
                "currently_contracted",
                "current_club",
                "player_number",
                "favorite_jersey_number",
                "official_contact",
                "has_passport",
                "ref_source",
            ],
        }
    }

    fn next(self) -> Step {
        Self::from_index(self.index() + 1).unwrap_or(Self::LAST)
    }

    fn previous(self) -> Step {
        self.index()
            .checked_sub(1)
            .and_then(Self::from_index)
            .unwrap_or(Step::Personal)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<usize>() {
            return Self::from_index(index).ok_or_else(|| format!("no step at index {}", index));
        }
        Self::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| format!("unknown step: {}", s))
    }
}

/// Account type of whoever is editing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Player,
    Club,
    Academy,
    Trainer,
    Agent,
    Admin,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::Player => "player",
            AccountType::Club => "club",
            AccountType::Academy => "academy",
            AccountType::Trainer => "trainer",
            AccountType::Agent => "agent",
            AccountType::Admin => "admin",
        }
    }

    pub fn organization_kind(self) -> Option<OrganizationKind> {
        OrganizationKind::from_account_type(self.as_str())
    }

    /// How the account is named on the official contact card
    pub fn title(self) -> &'static str {
        match self {
            AccountType::Club => "النادي",
            AccountType::Academy => "الأكاديمية",
            AccountType::Trainer => "المدرب",
            AccountType::Agent => "الوكيل",
            AccountType::Player | AccountType::Admin => "المسؤول",
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "player" => Ok(AccountType::Player),
            "club" => Ok(AccountType::Club),
            "academy" => Ok(AccountType::Academy),
            "trainer" => Ok(AccountType::Trainer),
            "agent" => Ok(AccountType::Agent),
            "admin" => Ok(AccountType::Admin),
            other => Err(format!("unknown account type: {}", other)),
        }
    }
}

/// The signed-in account driving the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editor {
    pub uid: String,
    pub account_type: AccountType,
}

/// Sign-in details used to prefill a new profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{} field(s) failed validation", .0.len())]
    Validation(FieldErrors),
    #[error("{}", SAVE_FAILED)]
    Save(#[source] StoreError),
    #[error("player {0} not found")]
    NotFound(String),
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub player_id: String,
    pub notified_videos: usize,
}

pub struct PlayerForm {
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn AdminNotifier>,
    editor: Editor,
    /// `None` until an organization-created profile is first written
    player_id: Option<String>,
    draft: PlayerProfile,
    /// Videos as last written, used to detect new uploads
    persisted_videos: Vec<VideoRef>,
    step: Step,
    errors: FieldErrors,
    /// Set when an organization is creating a new player
    creating_for: Option<OrganizationKind>,
}

fn identity_defaults(identity: &Identity) -> Fields {
    let mut fields = Fields::new();
    let values = [
        ("full_name", &identity.display_name),
        ("email", &identity.email),
        ("phone", &identity.phone),
        ("country", &identity.country),
    ];
    for (key, value) in values {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            fields.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
    fields
}

fn save_error(operation: &str, e: StoreError) -> FormError {
    error!(%operation, "Failed to write player profile: {}", e);
    FormError::Save(e)
}

impl PlayerForm {
    fn with_draft(
        store: Arc<dyn DocumentStore>,
        notifier: Arc<dyn AdminNotifier>,
        editor: Editor,
        player_id: Option<String>,
        draft: PlayerProfile,
    ) -> Self {
        Self {
            store,
            notifier,
            editor,
            player_id,
            persisted_videos: draft.videos.clone(),
            draft,
            step: Step::Personal,
            errors: FieldErrors::new(),
            creating_for: None,
        }
    }

    /// Open the editor's own profile, creating it from the sign-in identity
    /// the first time.
    pub async fn open_own(
        store: Arc<dyn DocumentStore>,
        notifier: Arc<dyn AdminNotifier>,
        editor: Editor,
        identity: &Identity,
    ) -> Result<Self, FormError> {
        let id = editor.uid.clone();
        let draft = match store.get(collections::PLAYERS, &id).await.map_err(FormError::Save)? {
            Some(doc) => PlayerProfile::from_fields(doc.id, doc.data),
            None => {
                let mut fields = identity_defaults(identity);
                fields.insert("created_at".into(), Value::String(Utc::now().to_rfc3339()));
                fields.insert("created_by".into(), Value::String(id.clone()));
                fields.insert(
                    "created_by_type".into(),
                    Value::String(editor.account_type.as_str().to_string()),
                );
                let result = store.upsert(collections::PLAYERS, &id, fields.clone()).await;
                PLAYER_WRITES.with_label_values(&["create", outcome(&result)]).inc();
                result.map_err(|e| save_error("create", e))?;
                info!(player_id = %id, "Created default player profile");
                PlayerProfile::from_fields(id.clone(), fields)
            }
        };
        Ok(Self::with_draft(store, notifier, editor, Some(id), draft))
    }

    /// Open an existing profile, e.g. an organization editing one of its players
    pub async fn open_existing(
        store: Arc<dyn DocumentStore>,
        notifier: Arc<dyn AdminNotifier>,
        editor: Editor,
        player_id: &str,
    ) -> Result<Self, FormError> {
        let doc = store
            .get(collections::PLAYERS, player_id)
            .await
            .map_err(FormError::Save)?
            .ok_or_else(|| FormError::NotFound(player_id.to_string()))?;
        let draft = PlayerProfile::from_fields(doc.id, doc.data);
        Ok(Self::with_draft(store, notifier, editor, Some(player_id.to_string()), draft))
    }

    /// Start a new player on behalf of the editor's organization. The draft is
    /// prefilled from the organization's account and nothing is written until
    /// the first validated step or save.
    pub async fn new_for_organization(
        store: Arc<dyn DocumentStore>,
        notifier: Arc<dyn AdminNotifier>,
        editor: Editor,
        identity: &Identity,
    ) -> Result<Self, FormError> {
        let kind = editor.account_type.organization_kind().unwrap_or(OrganizationKind::Club);
        let account = store
            .get(collections::USERS, &editor.uid)
            .await
            .map_err(FormError::Save)?
            .map(|doc| doc.data)
            .unwrap_or_default();

        let org_name = non_empty_str(&account, "full_name")
            .or_else(|| non_empty_str(&account, "name"))
            .or(identity.display_name.as_deref())
            .unwrap_or_default()
            .to_string();
        let title = editor.account_type.title();

        let mut draft = PlayerProfile::default();
        for (key, slot) in [
            ("country", &mut draft.country),
            ("city", &mut draft.city),
            ("phone", &mut draft.phone),
            ("nationality", &mut draft.nationality),
        ] {
            *slot = non_empty_str(&account, key).map(str::to_string);
        }
        draft.official_contact = Some(OfficialContact {
            name: org_name.clone(),
            title: title.to_string(),
            phone: non_empty_str(&account, "phone").unwrap_or_default().to_string(),
            email: identity.email.clone().unwrap_or_default(),
        });
        draft.ref_source = Some(format!("تم إضافته من قبل {}: {}", title, org_name));
        debug!(uid = %editor.uid, %kind, "Prefilled new player for organization");

        let mut form = Self::with_draft(store, notifier, editor, None, draft);
        form.creating_for = Some(kind);
        Ok(form)
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Resume editing at a given step
    pub fn jump_to(&mut self, step: Step) {
        self.step = step;
        self.errors = FieldErrors::new();
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn draft(&self) -> &PlayerProfile {
        &self.draft
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    /// Choosing a country clears the city
    pub fn set_country(&mut self, country: &str) {
        let country = country.trim();
        self.draft.country = (!country.is_empty()).then(|| country.to_string());
        self.draft.city = None;
    }

    /// Typing a city fills in its country when none is chosen yet
    pub fn set_city(&mut self, city: &str) {
        let city = city.trim();
        self.draft.city = (!city.is_empty()).then(|| city.to_string());
        let has_country = self.draft.country.as_deref().is_some_and(|c| !c.trim().is_empty());
        if !has_country {
            if let Some(country) = geo::country_for_city(city) {
                self.draft.country = Some(country.to_string());
            }
        }
    }

    /// Cities offered for the chosen country
    pub fn available_cities(&self) -> &'static [&'static str] {
        self.draft.country.as_deref().map(geo::cities_for).unwrap_or_default()
    }

    /// Merge edited fields into the draft. Country and city keep their linked
    /// behaviour unless both arrive together.
    pub fn apply(&mut self, mut patch: Fields) {
        let country = patch.remove("country");
        let city = patch.remove("city");

        if !patch.is_empty() {
            let id = self.draft.id.take();
            let mut fields = to_fields(&self.draft).unwrap_or_default();
            merge_fields(&mut fields, patch);
            self.draft = PlayerProfile::read(fields);
            self.draft.id = id;
        }

        let as_text = |v: &Value| v.as_str().unwrap_or_default().to_string();
        match (country, city) {
            (Some(country), Some(city)) => {
                self.set_country(&as_text(&country));
                self.set_city(&as_text(&city));
            }
            (Some(country), None) => self.set_country(&as_text(&country)),
            (None, Some(city)) => self.set_city(&as_text(&city)),
            (None, None) => {}
        }
    }

    pub fn add_video(&mut self, url: &str, desc: Option<&str>) {
        self.draft.videos.push(VideoRef {
            url: url.to_string(),
            desc: desc.map(str::to_string),
        });
    }

    pub fn remove_video(&mut self, index: usize) -> Option<VideoRef> {
        (index < self.draft.videos.len()).then(|| self.draft.videos.remove(index))
    }

    fn validate(&self, step: Step, today: NaiveDate) -> FieldErrors {
        match step {
            Step::Personal => validate_personal(&self.draft, today),
            Step::Sports => validate_sports(&self.draft),
            _ => FieldErrors::new(),
        }
    }

    fn reject(&mut self, errors: FieldErrors) -> FormError {
        debug!(fields = ?errors.fields().collect::<Vec<_>>(), "Player form failed validation");
        self.errors = errors.clone();
        FormError::Validation(errors)
    }

    /// Advance one step. Leaving a validated step requires it to pass and
    /// persists its fields. On the last step this does nothing.
    pub async fn next(&mut self, today: NaiveDate) -> Result<Step, FormError> {
        if self.step == Step::LAST {
            return Ok(self.step);
        }
        if self.step.is_validated() {
            let errors = self.validate(self.step, today);
            if !errors.is_empty() {
                return Err(self.reject(errors));
            }
            let patch = self.step_fields(self.step)?;
            self.write(patch, "step").await?;
        }
        self.errors = FieldErrors::new();
        self.step = self.step.next();
        Ok(self.step)
    }

    pub fn previous(&mut self) -> Step {
        self.errors = FieldErrors::new();
        self.step = self.step.previous();
        self.step
    }

    /// Validate every gated step and persist the whole draft, cleared form
    /// fields included. Each video
    /// added since the last write triggers one admin notification.
    pub async fn save(&mut self, today: NaiveDate) -> Result<SaveOutcome, FormError> {
        let mut errors = self.validate(Step::Personal, today);
        errors.extend(self.validate(Step::Sports, today));
        if !errors.is_empty() {
            return Err(self.reject(errors));
        }
        self.errors = FieldErrors::new();

        let mut patch = to_fields(&self.draft).map_err(|e| save_error("save", e))?;
        for key in Step::ALL.iter().flat_map(|step| step.fields()) {
            patch.entry(key.to_string()).or_insert(Value::Null);
        }
        let player_id = self.write(patch, "save").await?;

        let player_name = self.draft.full_name.clone().unwrap_or_default();
        let mut notified_videos = 0;
        for (index, video) in self.draft.videos.iter().enumerate() {
            let known = self.persisted_videos.get(index).map(|v| v.url.as_str());
            if video.url.trim().is_empty() || known == Some(video.url.as_str()) {
                continue;
            }
            let notice = VideoNotice::new(&player_id, &player_name, index, &video.url, video.desc.as_deref());
            notify_quietly(self.notifier.as_ref(), &notice).await;
            notified_videos += 1;
        }
        self.persisted_videos = self.draft.videos.clone();

        info!(%player_id, notified_videos, "Saved player profile");
        Ok(SaveOutcome {
            player_id,
            notified_videos,
        })
    }

    /// The draft's values for one step. Cleared values are sent as null so the
    /// merge overwrites them.
    fn step_fields(&self, step: Step) -> Result<Fields, FormError> {
        let all = to_fields(&self.draft).map_err(|e| save_error("step", e))?;
        Ok(step
            .fields()
            .iter()
            .map(|key| (key.to_string(), all.get(*key).cloned().unwrap_or(Value::Null)))
            .collect())
    }

    /// Stamp and write a patch, creating the document on an organization's
    /// first write. Returns the player id.
    async fn write(&mut self, mut patch: Fields, operation: &str) -> Result<String, FormError> {
        let now = Utc::now();
        let stamp = |v: &str| Value::String(v.to_string());
        patch.insert("updated_at".into(), stamp(now.to_rfc3339().as_str()));
        patch.insert("updated_by".into(), stamp(self.editor.uid.as_str()));
        patch.insert("updated_by_type".into(), stamp(self.editor.account_type.as_str()));

        let (result, operation) = match (&self.player_id, self.creating_for) {
            (Some(id), _) => {
                let result = self.store.upsert(collections::PLAYERS, id, patch).await;
                (result.map(|()| id.clone()), operation)
            }
            (None, kind) => {
                patch.insert("created_at".into(), stamp(now.to_rfc3339().as_str()));
                patch.insert("created_by".into(), stamp(self.editor.uid.as_str()));
                patch.insert("created_by_type".into(), stamp(self.editor.account_type.as_str()));
                let kind = kind.unwrap_or(OrganizationKind::Club);
                patch.insert(kind.id_field().into(), stamp(self.editor.uid.as_str()));
                (self.store.create(collections::PLAYERS, patch).await, "create")
            }
        };

        PLAYER_WRITES.with_label_values(&[operation, outcome(&result)]).inc();
        let id = result.map_err(|e| save_error(operation, e))?;

        if self.player_id.is_none() {
            info!(player_id = %id, uid = %self.editor.uid, "Organization created player profile");
            if let Some(kind) = self.creating_for {
                let owner = Some(self.editor.uid.clone());
                match kind {
                    OrganizationKind::Club => self.draft.club_id = owner,
                    OrganizationKind::Academy => self.draft.academy_id = owner,
                    OrganizationKind::Trainer => self.draft.trainer_id = owner,
                    OrganizationKind::Agent => self.draft.agent_id = owner,
                }
            }
            self.draft.id = Some(id.clone());
            self.player_id = Some(id.clone());
        }
        self.draft.updated_at = Some(now);
        self.draft.updated_by = Some(self.editor.uid.clone());
        self.draft.updated_by_type = Some(self.editor.account_type.as_str().to_string());
        Ok(id)
    }
}
