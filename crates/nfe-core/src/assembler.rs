//! Record-driven entity assembly.
//!
//! The [`Assembler`] owns every pending slot and context counter of one
//! document. Records are processed strictly in input order; completed
//! entities are buffered and only leave through [`Assembler::finish`].

use std::collections::BTreeMap;

use nfe_ingest::tokenize;
use nfe_model::{
    AttributeSet, CompletedEntity, EntityKind, RawRecord, RecordCode, SourceLine, Trigger,
};
use nfe_schema::SchemaRegistry;
use tracing::{debug, trace, warn};

use crate::binder::bind;
use crate::convert::ConversionOptions;
use crate::error::{ConvertError, Result};
use crate::handlers::{Counter, CounterUpdate, Handler, HandlerTable, Slot};

#[derive(Debug)]
pub(crate) struct OpenSlot {
    pub(crate) attributes: AttributeSet,
    pub(crate) code: RecordCode,
    pub(crate) opened_at: usize,
}

/// State machine for one document. Build a fresh one per document.
#[derive(Debug)]
pub struct Assembler<'a> {
    registry: &'a SchemaRegistry,
    table: &'a HandlerTable,
    options: &'a ConversionOptions,
    pub(crate) slots: BTreeMap<Slot, OpenSlot>,
    counters: BTreeMap<Counter, String>,
    pub(crate) emitted: Vec<CompletedEntity>,
    records: usize,
}

impl<'a> Assembler<'a> {
    pub fn new(
        registry: &'a SchemaRegistry,
        table: &'a HandlerTable,
        options: &'a ConversionOptions,
    ) -> Self {
        Self {
            registry,
            table,
            options,
            slots: BTreeMap::new(),
            counters: BTreeMap::new(),
            emitted: Vec::new(),
            records: 0,
        }
    }

    /// Tokenize and process one source line.
    pub fn process_line(&mut self, line: &SourceLine) -> Result<()> {
        let record = tokenize(line).map_err(|_| ConvertError::EmptyRecord {
            line_number: line.number,
        })?;
        self.process(&record)
    }

    /// Dispatch one record to the handler bound to its code.
    pub fn process(&mut self, record: &RawRecord) -> Result<()> {
        let code = record.code();
        let handler = *self
            .table
            .get(&code)
            .ok_or_else(|| unrecognized(record, &code))?;
        let layout = self
            .registry
            .lookup(&code)
            .map_err(|_| unrecognized(record, &code))?;
        let mut attributes = bind(record, layout);
        self.records += 1;

        let line_number = record.line_number;
        debug!(
            line = line_number,
            code = %code,
            behavior = handler.behavior(),
            "record"
        );
        if self.options.log_values {
            trace!(line = line_number, code = %code, ?attributes, "record values");
        }

        let trigger = Trigger::Record {
            code: code.clone(),
            line_number,
        };
        for slot in self.table.boundaries(&code) {
            if self.flush_slot(*slot, trigger.clone())? {
                debug!(
                    line = line_number,
                    code = %code,
                    slot = slot.name(),
                    "implicit group boundary"
                );
            }
        }

        match handler {
            Handler::Emit { kind, stamps } => {
                self.stamp(&mut attributes, stamps, &code, line_number)?;
                self.push(kind, attributes, trigger);
            }
            Handler::SetContext {
                counter,
                update,
                emit,
            } => {
                self.update_counter(counter, update, &attributes);
                if let Some(emission) = emit {
                    let wanted = emission
                        .required
                        .is_none_or(|name| attributes.non_empty(name).is_some());
                    if wanted {
                        self.stamp(&mut attributes, emission.stamps, &code, line_number)?;
                        self.push(emission.kind, attributes, trigger);
                    }
                }
            }
            Handler::Open { slot, prefill } => {
                attributes.fill_missing(prefill);
                let replaced = self.slots.insert(
                    slot,
                    OpenSlot {
                        attributes,
                        code: code.clone(),
                        opened_at: line_number,
                    },
                );
                if let Some(previous) = replaced
                    && self.options.warn_on_reopen
                {
                    warn!(
                        line = line_number,
                        slot = slot.name(),
                        opened_at = previous.opened_at,
                        "group reopened before it was closed; discarding previous"
                    );
                }
            }
            Handler::Continue { slot, only } => {
                let open = self.open_slot(slot, &code, line_number)?;
                match only {
                    Some(names) => open.attributes.merge_only(attributes, names),
                    None => open.attributes.merge(attributes),
                }
            }
            Handler::Close { slot } => {
                self.open_slot(slot, &code, line_number)?
                    .attributes
                    .merge(attributes);
                self.flush_slot(slot, trigger)?;
            }
            Handler::Accumulate { slot } => {
                self.slots
                    .entry(slot)
                    .or_insert_with(|| OpenSlot {
                        attributes: AttributeSet::new(),
                        code: code.clone(),
                        opened_at: line_number,
                    })
                    .attributes
                    .merge(attributes);
            }
            Handler::Marker => {}
        }
        Ok(())
    }

    /// Emit `slot` if it is open. Returns whether anything was emitted.
    pub fn flush_slot(&mut self, slot: Slot, trigger: Trigger) -> Result<bool> {
        let Some(open) = self.slots.remove(&slot) else {
            return Ok(false);
        };
        let mut attributes = open.attributes;
        let (code, line_number) = match &trigger {
            Trigger::Record { code, line_number } => (code.clone(), *line_number),
            Trigger::EndOfDocument => (open.code, open.opened_at),
        };
        self.stamp(&mut attributes, slot.stamps(), &code, line_number)?;
        self.push(slot.kind(), attributes, trigger);
        Ok(true)
    }

    pub fn is_open(&self, slot: Slot) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn counter(&self, counter: Counter) -> Option<&str> {
        self.counters.get(&counter).map(String::as_str)
    }

    /// Records dispatched so far.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Entities completed so far, in emission order.
    pub fn emitted(&self) -> &[CompletedEntity] {
        &self.emitted
    }

    fn open_slot(
        &mut self,
        slot: Slot,
        code: &RecordCode,
        line_number: usize,
    ) -> Result<&mut OpenSlot> {
        self.slots
            .get_mut(&slot)
            .ok_or_else(|| ConvertError::MissingContext {
                code: code.to_string(),
                context: format!("an open {} group", slot.name()),
                line_number,
            })
    }

    fn update_counter(
        &mut self,
        counter: Counter,
        update: CounterUpdate,
        attributes: &AttributeSet,
    ) {
        match update {
            CounterUpdate::FromAttribute(name) => match attributes.non_empty(name) {
                Some(value) => {
                    self.counters.insert(counter, value.trim().to_string());
                }
                None => {
                    self.counters.remove(&counter);
                }
            },
            CounterUpdate::Increment => {
                let next = self
                    .counter(counter)
                    .and_then(|value| value.parse::<usize>().ok())
                    .unwrap_or(0)
                    + 1;
                self.counters.insert(counter, next.to_string());
            }
        }
    }

    fn stamp(
        &self,
        attributes: &mut AttributeSet,
        counters: &[Counter],
        code: &RecordCode,
        line_number: usize,
    ) -> Result<()> {
        for counter in counters {
            let value = self
                .counter(*counter)
                .ok_or_else(|| ConvertError::MissingContext {
                    code: code.to_string(),
                    context: format!("a current {}", counter.attribute()),
                    line_number,
                })?;
            attributes.insert(counter.attribute(), value);
        }
        Ok(())
    }

    fn push(&mut self, kind: EntityKind, attributes: AttributeSet, trigger: Trigger) {
        self.emitted.push(CompletedEntity {
            kind,
            attributes,
            trigger,
        });
    }
}

fn unrecognized(record: &RawRecord, code: &RecordCode) -> ConvertError {
    ConvertError::UnrecognizedRecordType {
        code: code.to_string(),
        line: record.fields.join("|"),
        line_number: record.line_number,
    }
}
