/// Shared enumerations used across the codebase

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generates `as_str`, `ALL`, `Display` and `FromStr` for a string-backed enum.
/// The stored representation matches the serde/sqlx snake_case form.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Comma-separated list of accepted values, for error messages
            pub fn allowed() -> String {
                Self::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "'{}' is not one of: {}",
                        other,
                        Self::allowed()
                    )),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

string_enum!(TaskStatus {
    Pending => "pending",
    InProgress => "in_progress",
    Completed => "completed",
});

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

string_enum!(TaskPriority {
    Low => "low",
    Medium => "medium",
    High => "high",
});

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

string_enum!(EmployeeStatus {
    Active => "active",
    Inactive => "inactive",
});

impl Default for EmployeeStatus {
    fn default() -> Self {
        EmployeeStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    User,
}

string_enum!(UserRole {
    Admin => "admin",
    User => "user",
});

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

/// Deserialize a field that must distinguish "absent" from an explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]` on an
/// `Option<Option<T>>`: absent → `None`, `null` → `Some(None)`, value → `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A numeric body field that HTML forms submit as text: `95000`, `"95000"` and `""` are all accepted.
/// Parsing happens in [`crate::validation::Validator`] so bad text becomes a field error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Integer(i64),
    Float(f64),
    Text(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_representation() {
        assert_eq!("in_progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("high".parse::<TaskPriority>(), Ok(TaskPriority::High));
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert!("done".parse::<TaskStatus>().unwrap_err().contains("pending, in_progress, completed"));
    }

    #[test]
    fn double_option_distinguishes_null_from_absent() {
        #[derive(Deserialize)]
        struct Patch {
            #[serde(default, deserialize_with = "double_option")]
            employee_id: Option<Option<i64>>,
        }

        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"employee_id": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"employee_id": 3}"#).unwrap();

        assert_eq!(absent.employee_id, None);
        assert_eq!(null.employee_id, Some(None));
        assert_eq!(set.employee_id, Some(Some(3)));
    }

    #[test]
    fn number_or_text_accepts_form_values() {
        #[derive(Deserialize)]
        struct Form {
            #[serde(default, deserialize_with = "double_option")]
            employee_id: Option<Option<NumberOrText>>,
            salary: Option<NumberOrText>,
        }

        let form: Form = serde_json::from_str(r#"{"employee_id": "3", "salary": 95000.5}"#).unwrap();
        assert_eq!(form.employee_id, Some(Some(NumberOrText::Text("3".into()))));
        assert_eq!(form.salary, Some(NumberOrText::Float(95000.5)));

        let form: Form = serde_json::from_str(r#"{"employee_id": 3, "salary": ""}"#).unwrap();
        assert_eq!(form.employee_id, Some(Some(NumberOrText::Integer(3))));
        assert_eq!(form.salary, Some(NumberOrText::Text(String::new())));
    }
}
