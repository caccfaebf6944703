//! Project / experiment / run descriptors and the session's context triple.

use crate::wire::{Experiment, ExperimentRun, Project, UNASSIGNED_ID};
use serde::{Deserialize, Serialize};

/// Which project a session records into.
///
/// `New` is sent with id `-1`; the store either creates the project or
/// returns the id of an existing one with the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectConfig {
    New {
        name: String,
        #[serde(default)]
        author: String,
        #[serde(default)]
        description: String,
    },
    Existing {
        id: i32,
    },
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig::New {
            name: "default".to_string(),
            author: String::new(),
            description: String::new(),
        }
    }
}

impl ProjectConfig {
    pub fn to_wire(&self) -> Project {
        match self {
            Self::New {
                name,
                author,
                description,
            } => Project {
                id: UNASSIGNED_ID,
                name: name.clone(),
                author: author.clone(),
                description: description.clone(),
            },
            Self::Existing { id } => Project {
                id: *id,
                name: String::new(),
                author: String::new(),
                description: String::new(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExperimentConfig {
    New {
        name: String,
        #[serde(default)]
        description: String,
    },
    Existing {
        id: i32,
    },
    /// The project's implicit default experiment.
    #[default]
    Default,
}

impl ExperimentConfig {
    /// `project_id` is filled in by the session once the project is synced.
    pub fn to_wire(&self) -> Experiment {
        match self {
            Self::New { name, description } => Experiment {
                id: UNASSIGNED_ID,
                project_id: UNASSIGNED_ID,
                name: name.clone(),
                description: description.clone(),
                is_default: false,
            },
            Self::Existing { id } => Experiment {
                id: *id,
                project_id: UNASSIGNED_ID,
                name: String::new(),
                description: String::new(),
                is_default: false,
            },
            Self::Default => Experiment {
                id: UNASSIGNED_ID,
                project_id: UNASSIGNED_ID,
                name: String::new(),
                description: String::new(),
                is_default: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExperimentRunConfig {
    New {
        #[serde(default)]
        description: String,
    },
    Existing {
        id: i32,
    },
}

impl Default for ExperimentRunConfig {
    fn default() -> Self {
        ExperimentRunConfig::New {
            description: String::new(),
        }
    }
}

impl ExperimentRunConfig {
    /// `experiment_id` is filled in by the session once the experiment is
    /// synced.
    pub fn to_wire(&self) -> ExperimentRun {
        match self {
            Self::New { description } => ExperimentRun {
                id: UNASSIGNED_ID,
                experiment_id: UNASSIGNED_ID,
                description: description.clone(),
            },
            Self::Existing { id } => ExperimentRun {
                id: *id,
                experiment_id: UNASSIGNED_ID,
                description: String::new(),
            },
        }
    }
}

/// The active project, experiment and run. Each slot is filled once the
/// store has answered for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    pub project: Option<Project>,
    pub experiment: Option<Experiment>,
    pub experiment_run: Option<ExperimentRun>,
}

impl SessionContext {
    /// Project id, if the project has been synced and got a real id.
    pub fn project_id(&self) -> Option<i32> {
        self.project.as_ref().map(|p| p.id).filter(|id| *id >= 0)
    }

    pub fn experiment_id(&self) -> Option<i32> {
        self.experiment.as_ref().map(|e| e.id).filter(|id| *id >= 0)
    }

    pub fn experiment_run_id(&self) -> Option<i32> {
        self.experiment_run.as_ref().map(|r| r.id).filter(|id| *id >= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_parse_from_tagged_toml() {
        let project: ProjectConfig = toml::from_str(
            r#"
            kind = "new"
            name = "census"
            author = "ana"
            "#,
        )
        .unwrap();
        assert_eq!(
            project,
            ProjectConfig::New {
                name: "census".to_string(),
                author: "ana".to_string(),
                description: String::new(),
            }
        );

        let experiment: ExperimentConfig = toml::from_str("kind = \"default\"").unwrap();
        assert!(experiment.to_wire().is_default);

        let run: ExperimentRunConfig = toml::from_str("kind = \"existing\"\nid = 4").unwrap();
        assert_eq!(run.to_wire().id, 4);
    }

    #[test]
    fn unsynced_context_has_no_ids() {
        let mut context = SessionContext::default();
        assert_eq!(context.project_id(), None);

        context.project = Some(ProjectConfig::default().to_wire());
        assert_eq!(context.project_id(), None);

        context.project.as_mut().unwrap().id = 3;
        assert_eq!(context.project_id(), Some(3));
    }
}
