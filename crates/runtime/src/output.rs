use std::collections::BTreeMap;

use foundation::math::{Vec2, Vec3};

/// A value published to the host's presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    Scalar(f64),
    Text(String),
    Bool(bool),
    Vector(Vec3),
    Point2(Vec2),
}

impl OutputValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OutputValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            OutputValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OutputValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<Vec3> {
        match self {
            OutputValue::Vector(v) => Some(*v),
            _ => None,
        }
    }
}

/// Named output sink implemented by the host adapter.
pub trait OutputSink {
    fn publish(&mut self, name: &'static str, value: OutputValue);

    fn set_text(&mut self, name: &'static str, value: impl Into<String>)
    where
        Self: Sized,
    {
        self.publish(name, OutputValue::Text(value.into()));
    }

    fn set_scalar(&mut self, name: &'static str, value: f64)
    where
        Self: Sized,
    {
        self.publish(name, OutputValue::Scalar(value));
    }

    fn set_bool(&mut self, name: &'static str, value: bool)
    where
        Self: Sized,
    {
        self.publish(name, OutputValue::Bool(value));
    }

    fn set_vector(&mut self, name: &'static str, value: Vec3)
    where
        Self: Sized,
    {
        self.publish(name, OutputValue::Vector(value));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub name: &'static str,
    pub value: OutputValue,
}

/// Records every published value in order and keeps the latest per name.
///
/// Name order in [`OutputBus::latest`] is sorted, so snapshots are stable.
#[derive(Debug, Default)]
pub struct OutputBus {
    history: Vec<Published>,
    latest: BTreeMap<&'static str, OutputValue>,
}

impl OutputBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&OutputValue> {
        self.latest.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OutputValue::as_text)
    }

    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(OutputValue::as_scalar)
    }

    pub fn latest(&self) -> impl Iterator<Item = (&'static str, &OutputValue)> {
        self.latest.iter().map(|(k, v)| (*k, v))
    }

    pub fn history(&self) -> &[Published] {
        &self.history
    }

    /// Every value published under `name`, oldest first.
    pub fn values_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a OutputValue> + 'a {
        self.history
            .iter()
            .filter(move |p| p.name == name)
            .map(|p| &p.value)
    }

    pub fn drain(&mut self) -> Vec<Published> {
        std::mem::take(&mut self.history)
    }
}

impl OutputSink for OutputBus {
    fn publish(&mut self, name: &'static str, value: OutputValue) {
        self.latest.insert(name, value.clone());
        self.history.push(Published { name, value });
    }
}
