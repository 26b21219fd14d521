// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{lenient, lenient_list, text};
use crate::store::Fields;

labelled_enum! {
    /// Playing position
    Position {
        Goalkeeper => "حارس مرمى",
        RightBack => "مدافع أيمن",
        LeftBack => "مدافع أيسر",
        CenterBack => "قلب دفاع",
        DefensiveMidfielder => "وسط دفاعي",
        Midfielder => "وسط",
        RightWinger => "جناح أيمن",
        LeftWinger => "جناح أيسر",
        Striker => "مهاجم صريح",
        SecondStriker => "مهاجم ثاني",
    }
}

labelled_enum! {
    PreferredFoot {
        Right => "اليمنى",
        Left => "اليسرى",
        Both => "كلتاهما",
    }
}

labelled_enum! {
    BloodType {
        APositive => "A+",
        ANegative => "A-",
        BPositive => "B+",
        BNegative => "B-",
        OPositive => "O+",
        ONegative => "O-",
        AbPositive => "AB+",
        AbNegative => "AB-",
    }
}

labelled_enum! {
    EducationLevel {
        Primary => "ابتدائي",
        Intermediate => "متوسط",
        Secondary => "ثانوي",
        Diploma => "دبلوم",
        Bachelor => "بكالوريوس",
        Master => "ماجستير",
        Doctorate => "دكتوراه",
    }
}

labelled_enum! {
    /// Proficiency in a spoken language
    LanguageLevel {
        Beginner => "مبتدئ",
        Intermediate => "متوسط",
        Advanced => "متقدم",
        Professional => "محترف",
    }
}

labelled_enum! {
    YesNo {
        Yes => "yes",
        No => "no",
    }
}

/// A birth date as it appears in stored documents: ISO text, epoch
/// milliseconds, or a `{seconds}` timestamp object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredDate {
    Text(String),
    Timestamp {
        #[serde(alias = "_seconds")]
        seconds: i64,
    },
    EpochMillis(i64),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Injury {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Surgery {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClubStint {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    #[serde(default)]
    pub club: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub desc: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfficialContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// Career objectives: label to whether the player pursues it, plus free text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Objectives {
    #[serde(flatten)]
    pub goals: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub other: Option<String>,
}

pub type SkillRatings = BTreeMap<String, i64>;

/// A player profile document.
///
/// Every field is optional because documents are merged, never replaced.
/// Values that do not fit their declared type are read as absent, and fields
/// this struct does not know about are kept in `extra` so that a
/// read-modify-write cycle never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(skip)]
    pub id: Option<String>,

    // Personal
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub birth_date: Option<StoredDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub brief: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub address: Option<String>,

    // Education
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub education_level: Option<EducationLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub graduation_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub degree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub english_level: Option<LanguageLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub arabic_level: Option<LanguageLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub spanish_level: Option<LanguageLevel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub training_courses: Vec<String>,

    // Medical
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub blood_type: Option<BloodType>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub chronic_conditions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub chronic_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub allergies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub medical_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub injuries: Vec<Injury>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub surgeries: Vec<Surgery>,

    // Sports
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub primary_position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub secondary_position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub preferred_foot: Option<PreferredFoot>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub experience_years: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub sports_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub club_history: Vec<ClubStint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub contract_history: Vec<ContractRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub agent_history: Vec<AgentRecord>,

    // Skills
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub technical_skills: Option<SkillRatings>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub physical_skills: Option<SkillRatings>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub social_skills: Option<SkillRatings>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub objectives: Option<Objectives>,

    // Media
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub additional_images: Vec<ImageRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub videos: Vec<VideoRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub documents: Vec<DocumentRef>,

    // Contracts
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub currently_contracted: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub current_club: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub player_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub favorite_jersey_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub official_contact: Option<OfficialContact>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub has_passport: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub ref_source: Option<String>,

    // Affiliation
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub club_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub academy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub trainer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub agent_id: Option<String>,

    // Bookkeeping
    #[serde(rename = "accountType", default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub account_type: Option<String>,
    #[serde(rename = "isDeleted", default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub is_deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub created_by_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text")]
    pub updated_by_type: Option<String>,

    /// Fields not modelled above, including legacy camelCase keys
    #[serde(flatten)]
    pub extra: Fields,
}

impl PlayerProfile {
    /// Read a profile from stored document fields
    pub fn from_fields(id: impl Into<String>, fields: Fields) -> Self {
        let mut profile = Self::read(fields);
        profile.id = Some(id.into());
        profile
    }

    /// Read profile fields that are not yet tied to a stored document
    pub fn read(fields: Fields) -> Self {
        serde_json::from_value(serde_json::Value::Object(fields)).unwrap_or_default()
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(value: serde_json::Value) -> PlayerProfile {
        match value {
            serde_json::Value::Object(map) => PlayerProfile::from_fields("p1", map),
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn unknown_enumeration_values_read_as_absent() {
        let p = profile(json!({
            "full_name": "Omar",
            "primary_position": "libero",
            "preferred_foot": "اليسرى",
            "blood_type": "Z+"
        }));

        assert_eq!(p.full_name.as_deref(), Some("Omar"));
        assert_eq!(p.primary_position, None);
        assert_eq!(p.preferred_foot, Some(PreferredFoot::Left));
        assert_eq!(p.blood_type, None);
    }

    #[test]
    fn birth_date_accepts_stored_shapes() {
        let text = profile(json!({ "birth_date": "2005-04-12" }));
        assert_eq!(text.birth_date, Some(StoredDate::Text("2005-04-12".into())));

        let ts = profile(json!({ "birth_date": { "_seconds": 1_000, "_nanoseconds": 0 } }));
        assert_eq!(ts.birth_date, Some(StoredDate::Timestamp { seconds: 1_000 }));

        let junk = profile(json!({ "birth_date": [1, 2] }));
        assert_eq!(junk.birth_date, None);
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let p = profile(json!({
            "full_name": "Sara",
            "clubId": "c9",
            "profile_image": { "url": "https://cdn.test/a.png" },
            "height": 180
        }));

        assert_eq!(p.height.as_deref(), Some("180"));
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["clubId"], "c9");
        assert_eq!(value["profile_image"]["url"], "https://cdn.test/a.png");
        assert!(value.get("club_id").is_none());
    }

    #[test]
    fn malformed_list_entries_are_dropped() {
        let p = profile(json!({
            "videos": [{ "url": "https://v/1" }, "bogus", { "desc": "no url" }],
            "training_courses": "not a list"
        }));

        assert_eq!(p.videos.len(), 1);
        assert!(p.training_courses.is_empty());
    }
}
