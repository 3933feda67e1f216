use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{Error, Result};

/// Outcome of one interview stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StageResult {
    Pass,
    Pending,
    Fail,
}

impl StageResult {
    pub fn as_str(self) -> &'static str {
        match self {
            StageResult::Pass => "pass",
            StageResult::Pending => "pending",
            StageResult::Fail => "fail",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StageResult::Pass => "建议通过",
            StageResult::Pending => "待定",
            StageResult::Fail => "放弃",
        }
    }
}

impl std::str::FromStr for StageResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pass" => Ok(StageResult::Pass),
            "pending" => Ok(StageResult::Pending),
            "fail" => Ok(StageResult::Fail),
            other => Err(Error::UnknownValue {
                kind: "stage result",
                value: other.to_string(),
            }),
        }
    }
}

/// HR interview grade, S being the strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Grade {
    S,
    A,
    B,
    C,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
        }
    }
}

impl std::str::FromStr for Grade {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "S" => Ok(Grade::S),
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            other => Err(Error::UnknownValue {
                kind: "grade",
                value: other.to_string(),
            }),
        }
    }
}

// Both enums live in TEXT columns.
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <&str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> std::result::Result<Self, sqlx::error::BoxDynError> {
                let raw = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
                Ok(raw.parse::<$ty>()?)
            }
        }
    };
}

text_column!(StageResult);
text_column!(Grade);

/// Everything about a candidate that interview staff may edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, Validate, ToSchema)]
#[serde(default)]
pub struct CandidateFields {
    pub userid: Option<i64>,
    #[validate(length(min = 1, max = 135))]
    pub username: String,
    pub city: String,
    #[validate(length(max = 135))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    pub apply_position: String,
    pub born_address: String,
    pub gender: String,
    pub candidate_remark: String,

    pub bachelor_school: String,
    pub master_school: String,
    pub doctor_school: String,
    pub major: String,
    pub degree: String,
    pub test_score_of_general_ability: Option<Decimal>,
    pub paper_score: Option<Decimal>,

    pub first_score: Option<Decimal>,
    pub first_learning_ability: Option<Decimal>,
    pub first_professional_competency: Option<Decimal>,
    pub first_advantage: String,
    pub first_disadvantage: String,
    pub first_result: Option<StageResult>,
    pub first_recommend_position: String,
    pub first_interviewer: String,
    pub first_remark: String,

    pub second_score: Option<Decimal>,
    pub second_learning_ability: Option<Decimal>,
    pub second_professional_competency: Option<Decimal>,
    pub second_pursue_of_excellence: Option<Decimal>,
    pub second_communication_ability: Option<Decimal>,
    pub second_pressure_score: Option<Decimal>,
    pub second_advantage: String,
    pub second_disadvantage: String,
    pub second_result: Option<StageResult>,
    pub second_recommend_position: String,
    pub second_interviewer: String,
    pub second_remark: String,

    pub hr_score: Option<Grade>,
    pub hr_responsibility: Option<Grade>,
    pub hr_communication_ability: Option<Grade>,
    pub hr_logic_ability: Option<Grade>,
    pub hr_potential: Option<Grade>,
    pub hr_stability: Option<Grade>,
    pub hr_advantage: String,
    pub hr_disadvantage: String,
    pub hr_result: Option<StageResult>,
    pub hr_interviewer: String,
    pub hr_remark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Candidate {
    pub id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub fields: CandidateFields,
    pub creator: Option<String>,
    pub last_editor: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

/// Audit values written alongside a freshly inserted candidate.
#[derive(Debug, Clone)]
pub struct AuditStamp {
    pub creator: Option<String>,
    pub last_editor: Option<String>,
    pub at: DateTime<Utc>,
}

impl AuditStamp {
    /// Rows written by the bulk importer carry no acting user.
    pub fn anonymous(at: DateTime<Utc>) -> Self {
        Self {
            creator: None,
            last_editor: None,
            at,
        }
    }

    pub fn by(user: &str, at: DateTime<Utc>) -> Self {
        Self {
            creator: Some(user.to_string()),
            last_editor: Some(user.to_string()),
            at,
        }
    }
}

impl Candidate {
    /// Applies the save rules of the editor: creator is set once, last editor
    /// and modification time on every save.
    pub fn stamp_save(&mut self, acting_user: &str, now: DateTime<Utc>) {
        if self.creator.as_deref().map_or(true, str::is_empty) {
            self.creator = Some(acting_user.to_string());
        }
        self.last_editor = Some(acting_user.to_string());
        self.modified_date = if now > self.modified_date {
            now
        } else {
            self.modified_date + Duration::microseconds(1)
        };
    }

    /// Reads a field by name the way the admin renders it: blank for unset.
    pub fn display_value(&self, field: &str) -> Result<String> {
        let json = serde_json::to_value(self)?;
        let value = json
            .get(field)
            .ok_or_else(|| Error::Internal(format!("Candidate has no field '{}'", field)))?;
        Ok(match value {
            JsonValue::Null => String::new(),
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Display labels, in declaration order.
pub const FIELD_LABELS: &[(&str, &str)] = &[
    ("userid", "应聘者ID"),
    ("username", "姓名"),
    ("city", "城市"),
    ("phone", "手机号码"),
    ("email", "邮箱"),
    ("apply_position", "应聘职位"),
    ("born_address", "生源地"),
    ("gender", "性别"),
    ("candidate_remark", "候选人信息备注"),
    ("bachelor_school", "本科学校"),
    ("master_school", "研究生学校"),
    ("doctor_school", "博士生学校"),
    ("major", "专业"),
    ("degree", "学历"),
    ("test_score_of_general_ability", "综合能力测评成绩"),
    ("paper_score", "笔试成绩"),
    ("first_score", "初试分"),
    ("first_learning_ability", "学习能力得分"),
    ("first_professional_competency", "专业能力得分"),
    ("first_advantage", "优势"),
    ("first_disadvantage", "顾虑和不足"),
    ("first_result", "初试结果"),
    ("first_recommend_position", "推荐部门"),
    ("first_interviewer", "初试面试官"),
    ("first_remark", "初试备注"),
    ("second_score", "专业复试得分"),
    ("second_learning_ability", "学习能力得分"),
    ("second_professional_competency", "专业能力得分"),
    ("second_pursue_of_excellence", "追求卓越得分"),
    ("second_communication_ability", "沟通能力得分"),
    ("second_pressure_score", "抗压能力得分"),
    ("second_advantage", "优势"),
    ("second_disadvantage", "顾虑和不足"),
    ("second_result", "专业复试结果"),
    ("second_recommend_position", "建议方向或推荐部门"),
    ("second_interviewer", "专业复试面试官"),
    ("second_remark", "专业复试备注"),
    ("hr_score", "HR复试综合等级"),
    ("hr_responsibility", "HR责任心"),
    ("hr_communication_ability", "HR坦诚沟通"),
    ("hr_logic_ability", "HR逻辑思维"),
    ("hr_potential", "HR发展潜力"),
    ("hr_stability", "HR稳定性"),
    ("hr_advantage", "优势"),
    ("hr_disadvantage", "顾虑和不足"),
    ("hr_result", "HR复试结果"),
    ("hr_interviewer", "HR面试官"),
    ("hr_remark", "HR复试备注"),
    ("creator", "候选人数据的创建人"),
    ("last_editor", "最后编辑者"),
    ("created_date", "创建时间"),
    ("modified_date", "更新时间"),
];

pub fn label_for(field: &str) -> Result<&'static str> {
    FIELD_LABELS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, label)| *label)
        .ok_or_else(|| Error::Internal(format!("No display label for field '{}'", field)))
}

/// Form sections of the candidate editor. `None` is the untitled general
/// section.
pub const FIELDSETS: &[(Option<&str>, &[&str])] = &[
    (
        None,
        &[
            "userid",
            "username",
            "city",
            "phone",
            "email",
            "apply_position",
            "born_address",
            "gender",
            "candidate_remark",
            "bachelor_school",
            "master_school",
            "doctor_school",
            "major",
            "degree",
            "test_score_of_general_ability",
            "paper_score",
            "last_editor",
        ],
    ),
    (
        Some("第一轮面试记录"),
        &[
            "first_score",
            "first_learning_ability",
            "first_professional_competency",
            "first_advantage",
            "first_disadvantage",
            "first_result",
            "first_recommend_position",
            "first_interviewer",
            "first_remark",
        ],
    ),
    (
        Some("第二轮专业复试记录"),
        &[
            "second_score",
            "second_learning_ability",
            "second_professional_competency",
            "second_pursue_of_excellence",
            "second_communication_ability",
            "second_pressure_score",
            "second_advantage",
            "second_disadvantage",
            "second_result",
            "second_recommend_position",
            "second_interviewer",
            "second_remark",
        ],
    ),
    (
        Some("HR面试记录"),
        &[
            "hr_score",
            "hr_responsibility",
            "hr_communication_ability",
            "hr_logic_ability",
            "hr_potential",
            "hr_stability",
            "hr_advantage",
            "hr_disadvantage",
            "hr_result",
            "hr_interviewer",
            "hr_remark",
        ],
    ),
];

/// Never accepted from an edit form.
pub const READ_ONLY_FIELDS: &[&str] = &["creator", "created_date", "modified_date"];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate_at(modified: DateTime<Utc>) -> Candidate {
        Candidate {
            id: 1,
            fields: CandidateFields {
                username: "张三".into(),
                ..Default::default()
            },
            creator: None,
            last_editor: None,
            created_date: modified,
            modified_date: modified,
        }
    }

    #[test]
    fn first_save_sets_creator_and_later_saves_keep_it() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut c = candidate_at(t0);

        c.stamp_save("alice", t0 + Duration::minutes(1));
        assert_eq!(c.creator.as_deref(), Some("alice"));
        assert_eq!(c.last_editor.as_deref(), Some("alice"));
        let first = c.modified_date;

        c.stamp_save("bob", t0 + Duration::minutes(2));
        assert_eq!(c.creator.as_deref(), Some("alice"));
        assert_eq!(c.last_editor.as_deref(), Some("bob"));
        assert!(c.modified_date > first);
    }

    #[test]
    fn modified_date_advances_even_when_clock_does_not() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut c = candidate_at(t0);
        c.stamp_save("alice", t0 - Duration::seconds(5));
        assert!(c.modified_date > t0);
    }

    #[test]
    fn empty_creator_counts_as_unset() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut c = candidate_at(t0);
        c.creator = Some(String::new());
        c.stamp_save("carol", t0 + Duration::seconds(1));
        assert_eq!(c.creator.as_deref(), Some("carol"));
    }

    #[test]
    fn display_value_renders_unset_as_blank() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut c = candidate_at(t0);
        c.fields.first_result = Some(StageResult::Pass);
        c.fields.paper_score = Some(Decimal::new(875, 1));

        assert_eq!(c.display_value("username").unwrap(), "张三");
        assert_eq!(c.display_value("first_result").unwrap(), "pass");
        assert_eq!(c.display_value("second_result").unwrap(), "");
        assert_eq!(c.display_value("paper_score").unwrap(), "87.5");
        assert!(c.display_value("no_such_field").is_err());
    }

    #[test]
    fn every_fieldset_field_has_a_label() {
        for (_, fields) in FIELDSETS {
            for field in *fields {
                assert!(label_for(field).is_ok(), "missing label for {}", field);
            }
        }
        for field in READ_ONLY_FIELDS {
            assert!(!FIELDSETS.iter().any(|(_, fs)| fs.contains(field)));
        }
    }

    #[test]
    fn stage_result_parses_stored_values() {
        assert_eq!("pending".parse::<StageResult>().unwrap(), StageResult::Pending);
        assert!("maybe".parse::<StageResult>().is_err());
        assert_eq!("A".parse::<Grade>().unwrap(), Grade::A);
    }
}
