//! Deduplicación de ejecuciones repetidas.
//!
//! Entrada: orden de construcción con duplicados (salida del walker). Se
//! conserva la primera aparición de cada clave, en su posición; las
//! apariciones posteriores de una acción aportan sus outputs al registro
//! conservado. Así una acción multi-output alcanzada por varios caminos queda
//! como un único comando con la unión de los outputs observados.
use indexmap::map::Entry;
use indexmap::IndexMap;
use log::debug;

use crate::model::{CommandSequence, DedupKey, ProvenanceRecord};

pub fn finalize(duplicated: Vec<ProvenanceRecord>) -> CommandSequence {
    let total = duplicated.len();
    let mut kept: IndexMap<DedupKey, ProvenanceRecord> = IndexMap::with_capacity(total);
    for record in duplicated {
        match kept.entry(record.dedup_key()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => merge_outputs(slot.get_mut(), record),
        }
    }
    debug!("finalize: {} records -> {} commands", total, kept.len());
    CommandSequence::new(kept.into_values().collect())
}

fn merge_outputs(kept: &mut ProvenanceRecord, duplicate: ProvenanceRecord) {
    // Inputs y parámetros se asumen idénticos; no se validan.
    if let (ProvenanceRecord::Action(kept), ProvenanceRecord::Action(dup)) = (kept, duplicate) {
        for output in dup.outputs {
            if !kept.outputs.iter().any(|o| o.artifact == output.artifact) {
                kept.outputs.push(output);
            }
        }
    }
}
