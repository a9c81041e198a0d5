//! Terminal operations.
//!
//! Which operations a wrapper offers follows from the capabilities of its
//! collector's child. Each trait is implemented for [`LabelScope`] and for
//! `&MetricWrapper` (an emission without per-call labels). Bring them into
//! scope with `use huginn::prelude::*`.

use super::{LabelScope, MetricWrapper};
use crate::Result;
use crate::collector::{
    Collector, CounterChild, GaugeChild, ObserveChild, ReadChild, Timer, TimerSink,
};

/// Counter emissions.
pub trait CounterOps: Sized {
    fn inc(self) -> Result<()> {
        self.inc_by(1)
    }

    fn inc_by(self, value: u64) -> Result<()>;

    /// Set the counter to `value` if it is higher than the current one.
    fn absolute(self, value: u64) -> Result<()>;
}

/// Gauge emissions.
pub trait GaugeOps: Sized {
    fn inc(self) -> Result<()> {
        self.inc_by(1.0)
    }

    fn inc_by(self, value: f64) -> Result<()>;

    fn dec(self) -> Result<()> {
        self.dec_by(1.0)
    }

    fn dec_by(self, value: f64) -> Result<()>;

    fn set(self, value: f64) -> Result<()>;

    /// Set to the current unix time in seconds.
    fn set_to_current_time(self) -> Result<()>;
}

/// Histogram and summary emissions.
pub trait ObserveOps: Sized {
    fn observe(self, value: f64) -> Result<()>;
}

/// Timed emissions.
///
/// When the emission is skipped the timer runs against a detached child and
/// records nothing.
pub trait TimerOps: Sized {
    type Sink: TimerSink;

    fn start_timer(self) -> Result<Timer<Self::Sink>>;

    /// Run `f` and record how long it took.
    ///
    /// `f` is not run when the collector rejects the label vector.
    fn time<F, R>(self, f: F) -> Result<R>
    where
        F: FnOnce() -> R,
    {
        let timer = self.start_timer()?;
        let output = f();
        timer.observe_duration();
        Ok(output)
    }
}

/// Reads of the current value.
///
/// A skipped read returns the detached child's value.
pub trait ReadOps: Sized {
    type Value;

    fn get(self) -> Result<Self::Value>;
}

impl<C> CounterOps for LabelScope<'_, C>
where
    C: Collector,
    C::Child: CounterChild,
{
    fn inc_by(self, value: u64) -> Result<()> {
        self.emit(|child| child.increment(value))
    }

    fn absolute(self, value: u64) -> Result<()> {
        self.emit(|child| child.absolute(value))
    }
}

impl<C> GaugeOps for LabelScope<'_, C>
where
    C: Collector,
    C::Child: GaugeChild,
{
    fn inc_by(self, value: f64) -> Result<()> {
        self.emit(|child| child.increment(value))
    }

    fn dec_by(self, value: f64) -> Result<()> {
        self.emit(|child| child.decrement(value))
    }

    fn set(self, value: f64) -> Result<()> {
        self.emit(|child| child.set(value))
    }

    fn set_to_current_time(self) -> Result<()> {
        self.emit(|child| child.set_to_current_time())
    }
}

impl<C> ObserveOps for LabelScope<'_, C>
where
    C: Collector,
    C::Child: ObserveChild,
{
    fn observe(self, value: f64) -> Result<()> {
        self.emit(|child| child.observe(value))
    }
}

impl<C> TimerOps for LabelScope<'_, C>
where
    C: Collector,
    C::Child: TimerSink,
{
    type Sink = C::Child;

    fn start_timer(self) -> Result<Timer<C::Child>> {
        self.child_or_detached().map(Timer::new)
    }
}

impl<C> ReadOps for LabelScope<'_, C>
where
    C: Collector,
    C::Child: ReadChild,
{
    type Value = <C::Child as ReadChild>::Value;

    fn get(self) -> Result<Self::Value> {
        self.child_or_detached().map(|child| child.get())
    }
}

impl<C> CounterOps for &MetricWrapper<C>
where
    C: Collector,
    C::Child: CounterChild,
{
    fn inc_by(self, value: u64) -> Result<()> {
        CounterOps::inc_by(self.labels(), value)
    }

    fn absolute(self, value: u64) -> Result<()> {
        CounterOps::absolute(self.labels(), value)
    }
}

impl<C> GaugeOps for &MetricWrapper<C>
where
    C: Collector,
    C::Child: GaugeChild,
{
    fn inc_by(self, value: f64) -> Result<()> {
        GaugeOps::inc_by(self.labels(), value)
    }

    fn dec_by(self, value: f64) -> Result<()> {
        GaugeOps::dec_by(self.labels(), value)
    }

    fn set(self, value: f64) -> Result<()> {
        GaugeOps::set(self.labels(), value)
    }

    fn set_to_current_time(self) -> Result<()> {
        GaugeOps::set_to_current_time(self.labels())
    }
}

impl<C> ObserveOps for &MetricWrapper<C>
where
    C: Collector,
    C::Child: ObserveChild,
{
    fn observe(self, value: f64) -> Result<()> {
        ObserveOps::observe(self.labels(), value)
    }
}

impl<C> TimerOps for &MetricWrapper<C>
where
    C: Collector,
    C::Child: TimerSink,
{
    type Sink = C::Child;

    fn start_timer(self) -> Result<Timer<C::Child>> {
        TimerOps::start_timer(self.labels())
    }
}

impl<C> ReadOps for &MetricWrapper<C>
where
    C: Collector,
    C::Child: ReadChild,
{
    type Value = <C::Child as ReadChild>::Value;

    fn get(self) -> Result<Self::Value> {
        ReadOps::get(self.labels())
    }
}
