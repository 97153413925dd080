//! Earth-mode constructions: parallels, meridians and the mode toggle.

use super::add::{finish_parse, AddNoduleCommand};
use super::{Command, ObjectNameMap, OpcodeOutput};
use crate::nodule::{
    unset_vector, CircleDefinition, LineDefinition, NoduleKind, SphereCircle, SphereLine,
};
use crate::script::OpcodeRecord;
use crate::store::NoduleStore;
use easel_core::{GeometryError, Result};

pub(crate) const ADD_LATITUDE: &str = "AddLatitude";
pub(crate) const ADD_LONGITUDE: &str = "AddLongitude";
pub(crate) const SET_EARTH_MODE: &str = "SetEarthMode";

const EARTH_LATITUDE: &str = "earthLatitude";
const EARTH_LONGITUDE: &str = "earthLongitude";
const EARTH_MODE: &str = "earthMode";

fn check_latitude(degrees: f64) -> Result<()> {
    if !(degrees > -90.0 && degrees < 90.0) {
        return Err(GeometryError::InvalidParameter {
            name: EARTH_LATITUDE.to_string(),
            reason: format!("{} is not strictly between -90 and 90 degrees", degrees),
        }
        .into());
    }
    Ok(())
}

fn check_longitude(degrees: f64) -> Result<()> {
    if !(-180.0..=180.0).contains(&degrees) {
        return Err(GeometryError::InvalidParameter {
            name: EARTH_LONGITUDE.to_string(),
            reason: format!("{} is outside [-180, 180] degrees", degrees),
        }
        .into());
    }
    Ok(())
}

fn latitude_kind(degrees: f64) -> NoduleKind {
    NoduleKind::Circle(SphereCircle {
        center: unset_vector(),
        radius: 0.0,
        definition: CircleDefinition::Latitude { degrees },
    })
}

fn longitude_kind(degrees: f64) -> NoduleKind {
    NoduleKind::Line(SphereLine {
        normal: unset_vector(),
        anchor: unset_vector(),
        definition: LineDefinition::Longitude { degrees },
    })
}

impl AddNoduleCommand {
    /// Parallel of latitude, a circle about the north pole.
    pub fn latitude(store: &mut NoduleStore, degrees: f64) -> Result<Self> {
        check_latitude(degrees)?;
        let nodule = store.create(latitude_kind(degrees), vec![]);
        Ok(Self::with_label(store, nodule))
    }

    /// Meridian at `degrees` east of the x axis.
    pub fn longitude(store: &mut NoduleStore, degrees: f64) -> Result<Self> {
        check_longitude(degrees)?;
        let nodule = store.create(longitude_kind(degrees), vec![]);
        Ok(Self::with_label(store, nodule))
    }
}

pub(crate) fn encode_latitude(record: OpcodeRecord, degrees: f64) -> OpcodeRecord {
    record.with_number(EARTH_LATITUDE, degrees)
}

pub(crate) fn encode_longitude(record: OpcodeRecord, degrees: f64) -> OpcodeRecord {
    record.with_number(EARTH_LONGITUDE, degrees)
}

pub(crate) fn parse_latitude(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let degrees = record.number(EARTH_LATITUDE)?;
    check_latitude(degrees)?;
    finish_parse(record, names, store, latitude_kind(degrees), vec![])
}

pub(crate) fn parse_longitude(
    record: &OpcodeRecord,
    names: &mut ObjectNameMap,
    store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    let degrees = record.number(EARTH_LONGITUDE)?;
    check_longitude(degrees)?;
    finish_parse(record, names, store, longitude_kind(degrees), vec![])
}

/// Switches the construction in or out of earth mode.
#[derive(Debug, Clone)]
pub struct SetEarthModeCommand {
    earth_mode: bool,
    previous: Option<bool>,
}

impl SetEarthModeCommand {
    pub fn new(earth_mode: bool) -> Self {
        Self {
            earth_mode,
            previous: None,
        }
    }
}

impl Command for SetEarthModeCommand {
    fn name(&self) -> &str {
        "Set Earth Mode"
    }

    fn save_state(&mut self, store: &NoduleStore) {
        self.previous = Some(store.earth_mode());
    }

    fn apply(&mut self, store: &mut NoduleStore) -> Result<()> {
        store.set_earth_mode(self.earth_mode);
        Ok(())
    }

    fn restore_state(&mut self, store: &mut NoduleStore) -> Result<()> {
        if let Some(previous) = self.previous {
            store.set_earth_mode(previous);
        }
        Ok(())
    }

    fn to_opcode(&self, _store: &NoduleStore) -> Option<OpcodeOutput> {
        let record = OpcodeRecord::new(SET_EARTH_MODE).with_flag(EARTH_MODE, self.earth_mode);
        Some(OpcodeOutput::Line(record.encode()))
    }
}

pub(crate) fn parse_set_earth_mode(
    record: &OpcodeRecord,
    _names: &mut ObjectNameMap,
    _store: &mut NoduleStore,
) -> Result<Box<dyn Command>> {
    Ok(Box::new(SetEarthModeCommand::new(record.flag(EARTH_MODE)?)))
}
