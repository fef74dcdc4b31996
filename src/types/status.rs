use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

macro_rules! workflow_enum {
    ($(#[$doc:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Case-insensitive parse. Returns `None` for any value outside
            /// the fixed set.
            #[must_use]
            pub fn parse(s: &str) -> Option<Self> {
                match s.to_ascii_lowercase().as_str() {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let s = value.as_str()?;
                $name::parse(s).ok_or_else(|| {
                    FromSqlError::Other(
                        format!(concat!("unknown ", stringify!($name), ": {}"), s).into(),
                    )
                })
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(self.as_str().into())
            }
        }
    };
}

workflow_enum!(
    /// Topic approval workflow. Projects can only be created from approved topics.
    TopicStatus {
        Draft => "draft",
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
);

workflow_enum!(
    ProjectStatus {
        Active => "active",
        Completed => "completed",
        Archived => "archived",
    }
);

workflow_enum!(
    /// Sprint lifecycle. Updates accept any value in the set; forward-only
    /// ordering is not enforced.
    SprintStatus {
        Planned => "planned",
        Active => "active",
        Completed => "completed",
    }
);

workflow_enum!(
    /// Kanban columns. Transitions are any-to-any.
    TaskStatus {
        Todo => "todo",
        Doing => "doing",
        Done => "done",
    }
);

workflow_enum!(
    TaskPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);
