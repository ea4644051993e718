//! In-memory runtime instance.
//!
//! Backs the manifest runtime and lets callers observe every write, fire and lifecycle call made
//! against a bound instance. State is shared through `Rc<RefCell<_>>` so a [`MemoryModel`] handle
//! stays readable after its instance has been handed to a controller.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::foundation::core::PropertyType;
use crate::runtime::{
    AccessorError, AccessorResult, Fireable, ImageRequest, ImageSlot, LiveInstance, ValueSlot,
    ViewModelHandle,
};

/// One observable call against a memory instance.
#[derive(Clone, Debug, PartialEq)]
pub enum JournalEntry {
    /// A value-carrying property was assigned.
    Set {
        /// Property name.
        name: String,
        /// Assigned value.
        value: Value,
    },
    /// A trigger fired.
    Fire {
        /// Trigger name.
        name: String,
    },
    /// An image slot was bound or cleared.
    Image {
        /// Property name.
        name: String,
        /// Request handed to the slot.
        request: ImageRequest,
    },
    /// Native play.
    Play,
    /// Native stop.
    Stop,
    /// Instance cleanup.
    Cleanup,
}

#[derive(Debug)]
struct PropState {
    name: String,
    ty: PropertyType,
    value: Value,
    failing: bool,
    fires: u32,
}

#[derive(Debug, Default)]
struct ModelState {
    props: Vec<PropState>,
    journal: Vec<JournalEntry>,
    playing: bool,
    cleanups: u32,
}

/// Shared, observable view-model state.
#[derive(Clone, Debug, Default)]
pub struct MemoryModel {
    state: Rc<RefCell<ModelState>>,
}

impl MemoryModel {
    /// Empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a property with an arbitrary raw default.
    pub fn with(self, name: impl Into<String>, ty: PropertyType, raw: impl Into<Value>) -> Self {
        self.state.borrow_mut().props.push(PropState {
            name: name.into(),
            ty,
            value: raw.into(),
            failing: false,
            fires: 0,
        });
        self
    }

    /// Declare a string property.
    pub fn string(self, name: impl Into<String>, value: &str) -> Self {
        self.with(name, PropertyType::String, value)
    }

    /// Declare a number property.
    pub fn number(self, name: impl Into<String>, value: f64) -> Self {
        self.with(name, PropertyType::Number, value)
    }

    /// Declare a boolean property.
    pub fn boolean(self, name: impl Into<String>, value: bool) -> Self {
        self.with(name, PropertyType::Boolean, value)
    }

    /// Declare a color property.
    pub fn color(self, name: impl Into<String>, argb: u32) -> Self {
        self.with(name, PropertyType::Color, argb)
    }

    /// Declare a trigger.
    pub fn trigger(self, name: impl Into<String>) -> Self {
        self.with(name, PropertyType::Trigger, Value::Null)
    }

    /// Declare an image property.
    pub fn image(self, name: impl Into<String>) -> Self {
        self.with(name, PropertyType::Image, Value::Null)
    }

    /// Make every read and write of `name` fail.
    pub fn fail_accessor(&self, name: &str) {
        let mut st = self.state.borrow_mut();
        for p in st.props.iter_mut().filter(|p| p.name == name) {
            p.failing = true;
        }
    }

    /// Current value of `name`.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.state
            .borrow()
            .props
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.clone())
    }

    /// Number of times trigger `name` fired.
    pub fn fire_count(&self, name: &str) -> u32 {
        self.state
            .borrow()
            .props
            .iter()
            .find(|p| p.name == name)
            .map_or(0, |p| p.fires)
    }

    /// Every call recorded so far, in order.
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.state.borrow().journal.clone()
    }

    /// Whether native playback is running.
    pub fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    /// Number of cleanup calls received.
    pub fn cleanup_count(&self) -> u32 {
        self.state.borrow().cleanups
    }

    /// Accessor handle over this model.
    pub fn view_model(&self) -> MemoryViewModel {
        let slots = self
            .state
            .borrow()
            .props
            .iter()
            .enumerate()
            .map(|(index, p)| {
                (
                    p.name.clone(),
                    p.ty,
                    MemorySlot {
                        state: Rc::clone(&self.state),
                        index,
                    },
                )
            })
            .collect();
        MemoryViewModel { slots }
    }

    /// Live instance over this model.
    pub fn instance(&self) -> MemoryInstance {
        MemoryInstance {
            vm: self.view_model(),
            state: Rc::clone(&self.state),
        }
    }
}

/// Accessor for one property of a [`MemoryModel`].
#[derive(Debug)]
pub struct MemorySlot {
    state: Rc<RefCell<ModelState>>,
    index: usize,
}

impl MemorySlot {
    fn read(&self) -> AccessorResult<Value> {
        let st = self.state.borrow();
        let p = &st.props[self.index];
        if p.failing {
            return Err(AccessorError::new(format!("accessor '{}' failed", p.name)));
        }
        Ok(p.value.clone())
    }

    fn write(&self, value: Value) -> AccessorResult<()> {
        let mut st = self.state.borrow_mut();
        let p = &mut st.props[self.index];
        if p.failing {
            return Err(AccessorError::new(format!("accessor '{}' failed", p.name)));
        }
        p.value = value.clone();
        let name = p.name.clone();
        st.journal.push(JournalEntry::Set { name, value });
        Ok(())
    }
}

impl ValueSlot<String> for MemorySlot {
    fn raw_value(&self) -> AccessorResult<Value> {
        self.read()
    }

    fn set_value(&mut self, value: String) -> AccessorResult<()> {
        self.write(Value::String(value))
    }
}

impl ValueSlot<f64> for MemorySlot {
    fn raw_value(&self) -> AccessorResult<Value> {
        self.read()
    }

    fn set_value(&mut self, value: f64) -> AccessorResult<()> {
        self.write(Value::from(value))
    }
}

impl ValueSlot<bool> for MemorySlot {
    fn raw_value(&self) -> AccessorResult<Value> {
        self.read()
    }

    fn set_value(&mut self, value: bool) -> AccessorResult<()> {
        self.write(Value::Bool(value))
    }
}

impl ValueSlot<u32> for MemorySlot {
    fn raw_value(&self) -> AccessorResult<Value> {
        self.read()
    }

    fn set_value(&mut self, value: u32) -> AccessorResult<()> {
        self.write(Value::from(value))
    }
}

impl Fireable for MemorySlot {
    fn fire(&mut self) -> AccessorResult<()> {
        let mut st = self.state.borrow_mut();
        let p = &mut st.props[self.index];
        if p.failing {
            return Err(AccessorError::new(format!("trigger '{}' failed", p.name)));
        }
        p.fires += 1;
        let name = p.name.clone();
        st.journal.push(JournalEntry::Fire { name });
        Ok(())
    }
}

impl ImageSlot for MemorySlot {
    fn assign(&mut self, image: ImageRequest) -> AccessorResult<()> {
        let mut st = self.state.borrow_mut();
        let p = &mut st.props[self.index];
        if p.failing {
            return Err(AccessorError::new(format!("image '{}' failed", p.name)));
        }
        p.value = match &image {
            ImageRequest::Decoded(img) => serde_json::json!({
                "width": img.width,
                "height": img.height,
            }),
            ImageRequest::Remote(url) => Value::String(url.clone()),
            ImageRequest::Clear => Value::Null,
        };
        let name = p.name.clone();
        st.journal.push(JournalEntry::Image {
            name,
            request: image,
        });
        Ok(())
    }
}

/// [`ViewModelHandle`] over a [`MemoryModel`].
#[derive(Debug)]
pub struct MemoryViewModel {
    slots: Vec<(String, PropertyType, MemorySlot)>,
}

impl MemoryViewModel {
    fn find(&mut self, name: &str, ty: PropertyType) -> Option<&mut MemorySlot> {
        self.slots
            .iter_mut()
            .find(|(n, t, _)| n == name && *t == ty)
            .map(|(_, _, slot)| slot)
    }
}

impl ViewModelHandle for MemoryViewModel {
    fn properties(&self) -> Vec<(String, PropertyType)> {
        self.slots
            .iter()
            .map(|(name, ty, _)| (name.clone(), *ty))
            .collect()
    }

    fn string_prop(&mut self, name: &str) -> Option<&mut dyn ValueSlot<String>> {
        self.find(name, PropertyType::String)
            .map(|s| s as &mut dyn ValueSlot<String>)
    }

    fn number_prop(&mut self, name: &str) -> Option<&mut dyn ValueSlot<f64>> {
        self.find(name, PropertyType::Number)
            .map(|s| s as &mut dyn ValueSlot<f64>)
    }

    fn boolean_prop(&mut self, name: &str) -> Option<&mut dyn ValueSlot<bool>> {
        self.find(name, PropertyType::Boolean)
            .map(|s| s as &mut dyn ValueSlot<bool>)
    }

    fn color_prop(&mut self, name: &str) -> Option<&mut dyn ValueSlot<u32>> {
        self.find(name, PropertyType::Color)
            .map(|s| s as &mut dyn ValueSlot<u32>)
    }

    fn trigger_prop(&mut self, name: &str) -> Option<&mut dyn Fireable> {
        self.find(name, PropertyType::Trigger)
            .map(|s| s as &mut dyn Fireable)
    }

    fn image_prop(&mut self, name: &str) -> Option<&mut dyn ImageSlot> {
        self.find(name, PropertyType::Image)
            .map(|s| s as &mut dyn ImageSlot)
    }
}

/// [`LiveInstance`] over a [`MemoryModel`].
#[derive(Debug)]
pub struct MemoryInstance {
    vm: MemoryViewModel,
    state: Rc<RefCell<ModelState>>,
}

impl LiveInstance for MemoryInstance {
    fn view_model(&mut self) -> Option<&mut dyn ViewModelHandle> {
        Some(&mut self.vm)
    }

    fn play(&mut self) -> AccessorResult<()> {
        let mut st = self.state.borrow_mut();
        if st.cleanups > 0 {
            return Err(AccessorError::new("instance already released"));
        }
        st.playing = true;
        st.journal.push(JournalEntry::Play);
        Ok(())
    }

    fn stop(&mut self) -> AccessorResult<()> {
        let mut st = self.state.borrow_mut();
        st.playing = false;
        st.journal.push(JournalEntry::Stop);
        Ok(())
    }

    fn cleanup(&mut self) {
        let mut st = self.state.borrow_mut();
        st.playing = false;
        st.cleanups += 1;
        st.journal.push(JournalEntry::Cleanup);
    }
}
