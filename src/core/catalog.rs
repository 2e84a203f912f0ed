//! Fault Catalog: read-only registry of fault definitions
//!
//! Built once, shared behind `Arc` by every component that needs penalties or
//! correction cues.

use crate::error::{GradingError, Result};
use crate::types::{FaultDefinition, FaultInstance, FaultType, Severity};

/// Registry holding exactly one definition per `FaultType`
#[derive(Debug, Clone)]
pub struct FaultCatalog {
    definitions: Vec<FaultDefinition>,
}

impl Default for FaultCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl FaultCatalog {
    /// The built-in squat fault table
    pub fn standard() -> Self {
        use FaultType::*;
        use Severity::*;

        let definitions = vec![
            FaultDefinition::new(
                BackRounding, Critical, 40.0,
                "Spine rounds under load",
                "Keep your chest up and maintain a neutral spine",
            ),
            FaultDefinition::new(
                KneeValgus, Major, 30.0,
                "Knees cave inward",
                "Push your knees out in line with your toes",
            ),
            FaultDefinition::new(
                InsufficientDepth, Major, 25.0,
                "Squat stops above parallel",
                "Lower until your hip crease is just below your knee",
            ),
            FaultDefinition::new(
                ForwardLean, Major, 20.0,
                "Torso tips too far forward",
                "Keep your torso upright by bracing your core and driving through your heels",
            ),
            FaultDefinition::new(
                AsymmetricMovement, Minor, 15.0,
                "One side moves differently from the other",
                "Keep the movement balanced between both legs",
            ),
            FaultDefinition::new(
                HeelRise, Minor, 10.0,
                "Heels lift off the floor",
                "Keep your feet flat on the ground throughout the movement",
            ),
            FaultDefinition::new(
                IncompleteAttempt, Major, 35.0,
                "Repetition was not finished",
                "Complete the full movement from top to bottom and back up",
            )
            .with_fixed_confidence(0.9),
            FaultDefinition::new(
                SevereKneeValgus, Critical, 50.0,
                "Knees collapse inward sharply",
                "Stop and reset: drive your knees out before continuing",
            ),
            FaultDefinition::new(
                PartialRangeOfMotion, Major, 30.0,
                "Only part of the range of motion was used",
                "Use the full range of motion: sit back and down to depth",
            )
            .with_fixed_confidence(0.8),
        ];

        Self { definitions }
    }

    /// Build a catalog from custom definitions.
    ///
    /// Every fault type must appear exactly once with a positive penalty.
    pub fn from_definitions(definitions: Vec<FaultDefinition>) -> Result<Self> {
        let mut slots: Vec<Option<FaultDefinition>> = vec![None; FaultType::COUNT];

        for definition in definitions {
            if !(definition.base_penalty > 0.0) {
                return Err(GradingError::configuration(format!(
                    "{} has non-positive base penalty {}",
                    definition.fault_type, definition.base_penalty
                )));
            }
            if let Some(confidence) = definition.fixed_confidence {
                if !(0.0..=1.0).contains(&confidence) {
                    return Err(GradingError::configuration(format!(
                        "{} has fixed confidence {} outside [0, 1]",
                        definition.fault_type, confidence
                    )));
                }
            }
            let slot = &mut slots[definition.fault_type.index()];
            if slot.is_some() {
                return Err(GradingError::configuration(format!(
                    "{} defined more than once",
                    definition.fault_type
                )));
            }
            *slot = Some(definition);
        }

        let mut ordered = Vec::with_capacity(FaultType::COUNT);
        for (fault, slot) in FaultType::ALL.iter().zip(slots) {
            match slot {
                Some(definition) => ordered.push(definition),
                None => {
                    return Err(GradingError::configuration(format!(
                        "catalog is missing {}",
                        fault
                    )))
                }
            }
        }

        Ok(Self { definitions: ordered })
    }

    /// Definition for a fault type
    pub fn lookup(&self, fault: FaultType) -> &FaultDefinition {
        &self.definitions[fault.index()]
    }

    /// Definition for a raw fault id. Unknown ids are wiring bugs.
    pub fn lookup_code(&self, code: &str) -> Result<&FaultDefinition> {
        let fault: FaultType = code.parse()?;
        Ok(self.lookup(fault))
    }

    /// All definitions in catalog order
    pub fn definitions(&self) -> &[FaultDefinition] {
        &self.definitions
    }

    /// Fresh instance with penalty = base × min(cap, multiplier)
    pub fn instantiate(
        &self,
        fault: FaultType,
        confidence: f64,
        multiplier: f64,
        cap: f64,
        measured_value: Option<f64>,
    ) -> FaultInstance {
        let definition = self.lookup(fault);
        FaultInstance {
            fault_type: fault,
            severity: definition.severity,
            confidence,
            penalty_weight: definition.base_penalty * multiplier.min(cap),
            measured_value,
        }
    }

    /// Instance at base penalty using the definition's fixed confidence (1.0 if none)
    pub fn instantiate_fixed(&self, fault: FaultType) -> FaultInstance {
        let definition = self.lookup(fault);
        FaultInstance {
            fault_type: fault,
            severity: definition.severity,
            confidence: definition.fixed_confidence.unwrap_or(1.0),
            penalty_weight: definition.base_penalty,
            measured_value: None,
        }
    }

    pub fn correction_cue(&self, fault: FaultType) -> &str {
        &self.lookup(fault).correction_cue
    }
}

// =============================================================================
// TESTS
// =============================================================================
