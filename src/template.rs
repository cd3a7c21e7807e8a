use crate::model::{Cell, TemplateId};
use crate::scheduler::TimesheetError;
use serde::{Deserialize, Serialize};

/// Gabarit de rotation : séquence répétée d'heures par position de cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftTemplate {
    pub id: TemplateId,
    pub slots: Vec<Cell>,
}

impl ShiftTemplate {
    pub fn new<S: AsRef<str>>(id: S, slots: Vec<Cell>) -> Self {
        Self {
            id: TemplateId::new(id),
            slots,
        }
    }

    pub fn validate(&self) -> Result<(), TimesheetError> {
        let invalid = |reason: &str| TimesheetError::InvalidTemplate {
            id: self.id.as_str().to_owned(),
            reason: reason.to_owned(),
        };
        if self.id.as_str().trim().is_empty() {
            return Err(invalid("template id cannot be empty"));
        }
        if self.slots.is_empty() {
            return Err(invalid("template must contain at least one slot"));
        }
        for slot in &self.slots {
            match slot {
                Cell::Hours(h) if !h.is_finite() || *h <= 0.0 => {
                    return Err(invalid("slot hours must be a positive number"));
                }
                Cell::Marker(m) if !m.is_empty() => {
                    return Err(invalid("slot marker must be empty"));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Registre immuable des gabarits, dans l'ordre d'enregistrement.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: Vec<ShiftTemplate>,
}

impl TemplateRegistry {
    pub fn new(templates: Vec<ShiftTemplate>) -> Result<Self, TimesheetError> {
        for (i, template) in templates.iter().enumerate() {
            template.validate()?;
            if templates[..i].iter().any(|t| t.id == template.id) {
                return Err(TimesheetError::DuplicateTemplate(
                    template.id.as_str().to_owned(),
                ));
            }
        }
        Ok(Self { templates })
    }

    /// Séquence de créneaux d'un gabarit.
    pub fn lookup(&self, id: &TemplateId) -> Result<&[Cell], TimesheetError> {
        self.templates
            .iter()
            .find(|t| &t.id == id)
            .map(|t| t.slots.as_slice())
            .ok_or_else(|| TimesheetError::UnknownTemplate(id.as_str().to_owned()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &TemplateId> + '_ {
        self.templates.iter().map(|t| &t.id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
