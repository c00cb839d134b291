use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::{MachineID, Weight, WorkoutRecord};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HistoryFilter {
    pub machine: Option<MachineID>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl HistoryFilter {
    #[must_use]
    pub fn matches(&self, record: &WorkoutRecord) -> bool {
        self.machine.as_ref().is_none_or(|m| record.machine_id == *m)
            && self.from.is_none_or(|from| record.date >= from)
            && self.to.is_none_or(|to| record.date <= to)
    }
}

#[must_use]
pub fn filter_records(records: &[WorkoutRecord], filter: &HistoryFilter) -> Vec<WorkoutRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub records: Vec<WorkoutRecord>,
}

/// Groups appear in the order their date is first seen, records keep their input order.
#[must_use]
pub fn group_by_date(records: &[WorkoutRecord]) -> Vec<DateGroup> {
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();
    let mut groups: Vec<DateGroup> = vec![];

    for record in records {
        match index.get(&record.date) {
            Some(&i) => groups[i].records.push(record.clone()),
            None => {
                index.insert(record.date, groups.len());
                groups.push(DateGroup {
                    date: record.date,
                    records: vec![record.clone()],
                });
            }
        }
    }

    groups
}

#[derive(Debug, Clone, PartialEq)]
pub struct MachineMax {
    pub machine_id: MachineID,
    pub machine_name: String,
    pub weight: Weight,
    pub date: NaiveDate,
}

/// Highest weight per machine in first-seen order. On ties the earlier record is kept.
#[must_use]
pub fn max_weight_by_machine(records: &[WorkoutRecord]) -> Vec<MachineMax> {
    let mut index: HashMap<&MachineID, usize> = HashMap::new();
    let mut maxima: Vec<MachineMax> = vec![];

    for record in records {
        match index.get(&record.machine_id) {
            Some(&i) => {
                if record.weight > maxima[i].weight {
                    maxima[i].weight = record.weight;
                    maxima[i].date = record.date;
                }
            }
            None => {
                index.insert(&record.machine_id, maxima.len());
                maxima.push(MachineMax {
                    machine_id: record.machine_id.clone(),
                    machine_name: record.machine_name.clone(),
                    weight: record.weight,
                    date: record.date,
                });
            }
        }
    }

    maxima
}

/// Highest weight per date for one machine, in ascending date order.
#[must_use]
pub fn max_weight_by_date(records: &[WorkoutRecord], machine: &MachineID) -> Vec<(NaiveDate, f32)> {
    let mut series: BTreeMap<NaiveDate, f32> = BTreeMap::new();

    for record in records.iter().filter(|r| r.machine_id == *machine) {
        let weight = f32::from(record.weight);
        series
            .entry(record.date)
            .and_modify(|max| *max = max.max(weight))
            .or_insert(weight);
    }

    series.into_iter().collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub groups: Vec<DateGroup>,
    pub maxima: Vec<MachineMax>,
    pub series: Vec<(NaiveDate, f32)>,
    pub sessions: usize,
    pub sets: u32,
    pub volume: f32,
}

impl History {
    #[must_use]
    pub fn new(records: &[WorkoutRecord], filter: &HistoryFilter) -> Self {
        let records = filter_records(records, filter);
        let groups = group_by_date(&records);
        let series = filter
            .machine
            .as_ref()
            .map(|machine| max_weight_by_date(&records, machine))
            .unwrap_or_default();
        Self {
            sessions: groups.len(),
            sets: records.iter().map(|r| u32::from(r.sets)).sum(),
            volume: records.iter().map(WorkoutRecord::volume).sum(),
            maxima: max_weight_by_machine(&records),
            groups,
            series,
        }
    }
}
