// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::error::Error;
use std::fmt;
use time::Date;
use time::macros::format_description;

use crate::{
    CapacityException, CapacityExceptionId, ExceptionStatus, OnboardingId, OnboardingRecord,
    OnboardingStatus, Resource, ResourceId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|error| error.field == field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|error| error.message.as_str()).collect();
        f.write_str(&messages.join(" "))
    }
}

impl Error for ValidationErrors {}

fn require(errors: &mut ValidationErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(field, message);
    }
}

fn parse_optional_date(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
) -> Option<Date> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match Date::parse(trimmed, format_description!("[year]-[month]-[day]")) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(field, "Dates must use the YYYY-MM-DD format.");
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    ResourceAllocation,
    OnboardingRequest,
    CapacityException,
}

impl FormKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::ResourceAllocation => "Resource allocation",
            Self::OnboardingRequest => "Onboarding request",
            Self::CapacityException => "Capacity exception",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
}

const fn field(key: &'static str, label: &'static str, required: bool) -> FormField {
    FormField {
        key,
        label,
        required,
    }
}

pub const RESOURCE_FIELDS: [FormField; 7] = [
    field("resource_id", "Resource ID", true),
    field("name", "Name", true),
    field("role", "Role", true),
    field("app_id", "App ID", true),
    field("allocation_percent", "Allocation %", true),
    field("manager", "Manager", false),
    field("start_date", "Start date", false),
];

pub const ONBOARDING_FIELDS: [FormField; 4] = [
    field("app_id", "App ID", true),
    field("app_name", "App name", true),
    field("requester", "Requester", true),
    field("approver", "Approver", false),
];

pub const CAPACITY_EXCEPTION_FIELDS: [FormField; 5] = [
    field("app_id", "App ID", true),
    field("app_name", "App name", true),
    field("region", "Region", true),
    field("owner", "Assigned to", false),
    field("description", "Description", false),
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceAllocationForm {
    pub resource_id: String,
    pub name: String,
    pub role: String,
    pub app_id: String,
    pub allocation_percent: String,
    pub manager: String,
    pub start_date: String,
}

impl ResourceAllocationForm {
    pub fn from_record(record: &Resource) -> Self {
        Self {
            resource_id: record.id.to_string(),
            name: record.name.clone(),
            role: record.role.clone(),
            app_id: record.app_id.clone(),
            allocation_percent: record.allocation_percent.to_string(),
            manager: record.manager.clone(),
            start_date: record
                .start_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn to_record(&self) -> Result<Resource, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        require(&mut errors, "resource_id", &self.resource_id, "Resource ID is required.");
        require(&mut errors, "name", &self.name, "Name is required.");
        require(&mut errors, "role", &self.role, "Role is required.");
        require(&mut errors, "app_id", &self.app_id, "App ID is required.");

        let allocation = self.allocation_percent.trim();
        let mut allocation_percent = 0;
        if allocation.is_empty() {
            errors.push("allocation_percent", "Allocation is required.");
        } else {
            match allocation.parse::<u8>() {
                Ok(value) if value <= 100 => allocation_percent = value,
                _ => errors.push(
                    "allocation_percent",
                    "Allocation must be a whole number from 0 to 100.",
                ),
            }
        }
        let start_date = parse_optional_date(&mut errors, "start_date", &self.start_date);
        errors.into_result()?;

        Ok(Resource {
            id: ResourceId::new(self.resource_id.trim()),
            name: self.name.trim().to_owned(),
            role: self.role.trim().to_owned(),
            app_id: self.app_id.trim().to_owned(),
            allocation_percent,
            manager: self.manager.trim().to_owned(),
            start_date,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OnboardingRequestForm {
    pub app_id: String,
    pub app_name: String,
    pub requester: String,
    pub approver: String,
}

impl OnboardingRequestForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        require(&mut errors, "app_id", &self.app_id, "App ID is required.");
        require(&mut errors, "app_name", &self.app_name, "App name is required.");
        require(&mut errors, "requester", &self.requester, "Requester is required.");
        errors.into_result()
    }

    pub fn to_record(
        &self,
        id: OnboardingId,
        submitted_on: Date,
    ) -> Result<OnboardingRecord, ValidationErrors> {
        self.validate()?;
        let approver = self.approver.trim();
        Ok(OnboardingRecord {
            id,
            app_id: self.app_id.trim().to_owned(),
            app_name: self.app_name.trim().to_owned(),
            requester: self.requester.trim().to_owned(),
            status: OnboardingStatus::Pending,
            submitted_on,
            approver: (!approver.is_empty()).then(|| approver.to_owned()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapacityExceptionForm {
    pub app_id: String,
    pub app_name: String,
    pub region: String,
    pub owner: String,
    pub description: String,
}

impl CapacityExceptionForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        require(&mut errors, "app_id", &self.app_id, "App ID is required.");
        require(&mut errors, "app_name", &self.app_name, "App name is required.");
        require(&mut errors, "region", &self.region, "Region is required.");
        errors.into_result()
    }

    /// New tickets start `Open`, or `Assigned` when an owner is given.
    pub fn to_record(
        &self,
        id: CapacityExceptionId,
        first_reported: Date,
    ) -> Result<CapacityException, ValidationErrors> {
        self.validate()?;
        let owner = self.owner.trim().to_owned();
        let status = if owner.is_empty() {
            ExceptionStatus::Open
        } else {
            ExceptionStatus::Assigned
        };
        Ok(CapacityException {
            id,
            app_id: self.app_id.trim().to_owned(),
            app_name: self.app_name.trim().to_owned(),
            region: self.region.trim().to_uppercase(),
            status,
            first_reported,
            owner,
            description: self.description.trim().to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    Resource(ResourceAllocationForm),
    Onboarding(OnboardingRequestForm),
    CapacityException(CapacityExceptionForm),
}

impl FormPayload {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Resource(_) => FormKind::ResourceAllocation,
            Self::Onboarding(_) => FormKind::OnboardingRequest,
            Self::CapacityException(_) => FormKind::CapacityException,
        }
    }

    pub fn blank_for(kind: FormKind) -> Self {
        match kind {
            FormKind::ResourceAllocation => Self::Resource(ResourceAllocationForm::default()),
            FormKind::OnboardingRequest => Self::Onboarding(OnboardingRequestForm::default()),
            FormKind::CapacityException => {
                Self::CapacityException(CapacityExceptionForm::default())
            }
        }
    }

    pub fn fields(&self) -> &'static [FormField] {
        match self {
            Self::Resource(_) => &RESOURCE_FIELDS,
            Self::Onboarding(_) => &ONBOARDING_FIELDS,
            Self::CapacityException(_) => &CAPACITY_EXCEPTION_FIELDS,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::Resource(form) => form.to_record().map(|_| ()),
            Self::Onboarding(form) => form.validate(),
            Self::CapacityException(form) => form.validate(),
        }
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        let value = match (self, key) {
            (Self::Resource(form), "resource_id") => &form.resource_id,
            (Self::Resource(form), "name") => &form.name,
            (Self::Resource(form), "role") => &form.role,
            (Self::Resource(form), "app_id") => &form.app_id,
            (Self::Resource(form), "allocation_percent") => &form.allocation_percent,
            (Self::Resource(form), "manager") => &form.manager,
            (Self::Resource(form), "start_date") => &form.start_date,
            (Self::Onboarding(form), "app_id") => &form.app_id,
            (Self::Onboarding(form), "app_name") => &form.app_name,
            (Self::Onboarding(form), "requester") => &form.requester,
            (Self::Onboarding(form), "approver") => &form.approver,
            (Self::CapacityException(form), "app_id") => &form.app_id,
            (Self::CapacityException(form), "app_name") => &form.app_name,
            (Self::CapacityException(form), "region") => &form.region,
            (Self::CapacityException(form), "owner") => &form.owner,
            (Self::CapacityException(form), "description") => &form.description,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn value_mut(&mut self, key: &str) -> Option<&mut String> {
        let value = match (self, key) {
            (Self::Resource(form), "resource_id") => &mut form.resource_id,
            (Self::Resource(form), "name") => &mut form.name,
            (Self::Resource(form), "role") => &mut form.role,
            (Self::Resource(form), "app_id") => &mut form.app_id,
            (Self::Resource(form), "allocation_percent") => &mut form.allocation_percent,
            (Self::Resource(form), "manager") => &mut form.manager,
            (Self::Resource(form), "start_date") => &mut form.start_date,
            (Self::Onboarding(form), "app_id") => &mut form.app_id,
            (Self::Onboarding(form), "app_name") => &mut form.app_name,
            (Self::Onboarding(form), "requester") => &mut form.requester,
            (Self::Onboarding(form), "approver") => &mut form.approver,
            (Self::CapacityException(form), "app_id") => &mut form.app_id,
            (Self::CapacityException(form), "app_name") => &mut form.app_name,
            (Self::CapacityException(form), "region") => &mut form.region,
            (Self::CapacityException(form), "owner") => &mut form.owner,
            (Self::CapacityException(form), "description") => &mut form.description,
            _ => return None,
        };
        Some(value)
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> bool {
        match self.value_mut(key) {
            Some(slot) => {
                *slot = value.to_owned();
                true
            }
            None => false,
        }
    }
}
