// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use appdash_table::list;
use std::error::Error;
use std::fmt;
use tracing::debug;

use crate::{ApplicationDetail, Notification, NotificationSink, Proficiency, Relationship, Skill};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateError {
    pub kind: &'static str,
    pub name: String,
}

impl DuplicateError {
    pub fn notification(&self) -> Notification {
        Notification::error(
            format!("Duplicate {}", self.kind),
            format!("{} is already in the list.", self.name),
        )
    }
}

impl fmt::Display for DuplicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} already exists", self.kind, self.name)
    }
}

impl Error for DuplicateError {}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Team skills for one application, unique by case-insensitive name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillInventory {
    skills: Vec<Skill>,
}

impl SkillInventory {
    pub fn new(skills: Vec<Skill>) -> Self {
        Self { skills }
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn into_skills(self) -> Vec<Skill> {
        self.skills
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        let key = name_key(name);
        self.skills.iter().any(|skill| name_key(&skill.name) == key)
    }

    pub fn add(
        &mut self,
        skill: Skill,
        notifier: &mut dyn NotificationSink,
    ) -> Result<(), DuplicateError> {
        let name = skill.name.trim().to_owned();
        let skill = Skill { name, ..skill };
        match list::appended_unique(&self.skills, skill.clone(), |item| name_key(&item.name)) {
            Some(next) => {
                self.skills = next;
                notifier.notify(Notification::success(
                    "Skill added",
                    format!("{} ({})", skill.name, skill.proficiency.label()),
                ));
                Ok(())
            }
            None => {
                let error = DuplicateError {
                    kind: "skill",
                    name: skill.name,
                };
                debug!(%error, "rejected duplicate skill");
                notifier.notify(error.notification());
                Err(error)
            }
        }
    }

    /// Returns `false` when the name is not present.
    pub fn set_proficiency(&mut self, name: &str, proficiency: Proficiency) -> bool {
        let key = name_key(name);
        let Some(current) = self.skills.iter().find(|skill| name_key(&skill.name) == key) else {
            return false;
        };
        let updated = Skill {
            name: current.name.clone(),
            proficiency,
        };
        self.skills = list::replaced_by(&self.skills, updated, |a, b| a.name == b.name);
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<Skill> {
        let key = name_key(name);
        let removed = self
            .skills
            .iter()
            .find(|skill| name_key(&skill.name) == key)
            .cloned()?;
        self.skills = list::removed_where(&self.skills, |skill| name_key(&skill.name) == key);
        Some(removed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipList {
    items: Vec<Relationship>,
}

impl RelationshipList {
    pub fn new(items: Vec<Relationship>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Relationship] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Relationship> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(
        &mut self,
        relationship: Relationship,
        notifier: &mut dyn NotificationSink,
    ) -> Result<(), DuplicateError> {
        let name = relationship.name.trim().to_owned();
        let relationship = Relationship {
            name,
            ..relationship
        };
        match list::appended_unique(&self.items, relationship.clone(), |item| {
            name_key(&item.name)
        }) {
            Some(next) => {
                self.items = next;
                notifier.notify(Notification::success(
                    "Relationship added",
                    relationship.name,
                ));
                Ok(())
            }
            None => {
                let error = DuplicateError {
                    kind: "relationship",
                    name: relationship.name,
                };
                debug!(%error, "rejected duplicate relationship");
                notifier.notify(error.notification());
                Err(error)
            }
        }
    }

    /// Removing an absent name is a no-op.
    pub fn remove(&mut self, name: &str) -> bool {
        let key = name_key(name);
        let next = list::removed_where(&self.items, |item| name_key(&item.name) == key);
        let changed = next.len() != self.items.len();
        self.items = next;
        changed
    }
}

/// One change to an application's team skills or relationships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEdit {
    AddSkill(Skill),
    RemoveSkill(String),
    AddRelationship(Relationship),
    RemoveRelationship(String),
}

impl InventoryEdit {
    /// Returns `Ok(false)` when a removal names nothing. `app` is untouched
    /// unless the edit changed something.
    pub fn apply(
        &self,
        app: &mut ApplicationDetail,
        notifier: &mut dyn NotificationSink,
    ) -> Result<bool, DuplicateError> {
        match self {
            Self::AddSkill(skill) => {
                let mut inventory = SkillInventory::new(app.team_skills.clone());
                inventory.add(skill.clone(), notifier)?;
                app.team_skills = inventory.into_skills();
            }
            Self::RemoveSkill(name) => {
                let mut inventory = SkillInventory::new(app.team_skills.clone());
                let Some(removed) = inventory.remove(name) else {
                    return Ok(false);
                };
                notifier.notify(Notification::success("Skill removed", removed.name));
                app.team_skills = inventory.into_skills();
            }
            Self::AddRelationship(relationship) => {
                let mut list = RelationshipList::new(app.relationships.clone());
                list.add(relationship.clone(), notifier)?;
                app.relationships = list.into_items();
            }
            Self::RemoveRelationship(name) => {
                let mut list = RelationshipList::new(app.relationships.clone());
                if !list.remove(name) {
                    return Ok(false);
                }
                notifier.notify(Notification::success("Relationship removed", name.trim()));
                app.relationships = list.into_items();
            }
        }
        Ok(true)
    }
}
