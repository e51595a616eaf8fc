//! `ArchiveRecordSource`: traduce `action.yaml` a registros tipados.

use std::path::Path;

use indexmap::IndexMap;
use log::{debug, warn};
use prov_core::constants::{IMPORT_DIR_SUFFIX, LEGACY_OUTPUT_NAME, PLACEHOLDER};
use prov_core::{ActionRecord, ArtifactId, CoreError, ImportRecord, InputRef, LoadedRecord, MetadataRef, OutputRef,
                Parameter, ProvenanceRecord, RecordSource};
use serde_yaml::Value;

use crate::error::ArchiveError;
use crate::layout::ArchiveLayout;
use crate::metadata;
use crate::yaml;

const IMPORT_ACTION_TYPE: &str = "import";
const UNKNOWN_VERSION: &str = "unknown";

#[derive(Debug, Clone)]
pub struct ArchiveRecordSource {
    layout: ArchiveLayout,
}

impl ArchiveRecordSource {
    pub fn new(layout: ArchiveLayout) -> Self { Self { layout } }

    /// Atajo de `ArchiveLayout::open` + `new`.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> { Ok(Self::new(ArchiveLayout::open(path)?)) }

    pub fn layout(&self) -> &ArchiveLayout { &self.layout }

    pub fn root_id(&self) -> &ArtifactId { self.layout.root_id() }

    /// Carga y tipa el registro que produjo `id`.
    pub fn load_record(&self, id: &ArtifactId) -> Result<LoadedRecord, ArchiveError> {
        let path = self.layout.action_file(id);
        if !path.is_file() {
            return Err(ArchiveError::MissingRecord { id: id.clone(), path });
        }
        let doc = yaml::load(&path)?;
        let execution_id = yaml::require_str(&doc, &["execution", "uuid"], &path)?;
        let action_type = yaml::require_str(&doc, &["action", "type"], &path)?;

        let record = if action_type == IMPORT_ACTION_TYPE {
            self.import_record(id, &doc, execution_id)?
        } else {
            self.action_record(id, &doc, &path, execution_id)?
        };
        let loaded = LoadedRecord::from_record(record);
        debug!("load: artifact={} type={} deps={}", id, action_type, loaded.dependencies.len());
        Ok(loaded)
    }

    fn import_record(&self, id: &ArtifactId, doc: &Value, execution_id: String)
                     -> Result<ProvenanceRecord<ArtifactId>, ArchiveError> {
        let input_format = yaml::get(doc, &["action", "format"]).and_then(yaml::scalar_string)
                                                                .unwrap_or_else(|| PLACEHOLDER.to_string());
        let manifest = yaml::get(doc, &["action", "manifest"]).and_then(|m| yaml::untag(m).as_sequence());
        let single_file = match manifest {
            Some(entries) if entries.len() == 1 => yaml::get(&entries[0], &["name"]).and_then(yaml::scalar_string),
            _ => None,
        };
        let input_path = single_file.unwrap_or_else(|| format!("{input_format}{IMPORT_DIR_SUFFIX}"));

        let metadata_path = self.layout.metadata_file(id);
        let declared_type = yaml::require_str(&yaml::load(&metadata_path)?, &["type"], &metadata_path)?;

        Ok(ProvenanceRecord::Import(ImportRecord { execution_id,
                                                   input_path,
                                                   input_format,
                                                   declared_type,
                                                   produced: id.clone() }))
    }

    fn action_record(&self, id: &ArtifactId, doc: &Value, path: &Path, execution_id: String)
                     -> Result<ProvenanceRecord<ArtifactId>, ArchiveError> {
        // `!ref 'environment:plugins:<name>'`
        let plugin_ref = yaml::require_str(doc, &["action", "plugin"], path)?;
        let plugin_name = plugin_ref.rsplit(':').next().unwrap_or(&plugin_ref).to_string();
        let action_name = yaml::require_str(doc, &["action", "action"], path)?;

        let inputs = parse_inputs(doc, path)?;
        let (metadata, parameters) = self.parse_parameters(id, doc, path)?;
        let outputs = vec![self.output(id, doc)?];

        Ok(ProvenanceRecord::Action(ActionRecord { execution_id,
                                                   plugin_name,
                                                   plugin_versions: plugin_versions(doc),
                                                   action_name,
                                                   inputs,
                                                   metadata,
                                                   parameters,
                                                   outputs }))
    }

    fn parse_parameters(&self, id: &ArtifactId, doc: &Value, path: &Path)
                        -> Result<(Vec<MetadataRef>, Vec<Parameter>), ArchiveError> {
        let mut metadata = Vec::new();
        let mut parameters = Vec::new();
        for item in sequence_at(doc, &["action", "parameters"]) {
            let (name, value) = yaml::single_entry(item).ok_or_else(|| malformed(path, "action.parameters",
                                                                                  "expected `- name: value` entries"))?;
            if yaml::tag_name(value).as_deref() != Some(yaml::METADATA_TAG) {
                parameters.push(Parameter { name, value: yaml::to_json(value) });
                continue;
            }
            // Formatos nuevos prefijan el archivo con los uuids de origen: `uuid:file.tsv`.
            let raw = yaml::scalar_string(value).ok_or_else(|| malformed(path, &name, "empty metadata reference"))?;
            let file = raw.rsplit(':').next().unwrap_or(&raw).to_string();
            let source_path = self.layout.sidecar(id, &file);
            let sidecar = metadata::read_sidecar(&source_path)?;
            if sidecar.repaired {
                warn!("artifact {}: metadata `{}` had no usable header; a synthesized one will be exported", id, file);
            }
            metadata.push(MetadataRef { name, file, source_path, kind: sidecar.kind, repaired: sidecar.repaired });
        }
        Ok((metadata, parameters))
    }

    /// Salida registrada en `output-name`. Los archivos antiguos no la
    /// guardan: se usa un nombre fijo y el uuid de `metadata.yaml`.
    fn output(&self, id: &ArtifactId, doc: &Value) -> Result<OutputRef<ArtifactId>, ArchiveError> {
        if let Some(name) = yaml::get(doc, &["action", "output-name"]).and_then(yaml::scalar_string) {
            return Ok(OutputRef { name, artifact: id.clone() });
        }
        let metadata_path = self.layout.metadata_file(id);
        let uuid = yaml::require_str(&yaml::load(&metadata_path)?, &["uuid"], &metadata_path)?;
        warn!("artifact {}: no output-name recorded, using `{}`", id, LEGACY_OUTPUT_NAME);
        Ok(OutputRef { name: LEGACY_OUTPUT_NAME.to_string(), artifact: ArtifactId::new(uuid) })
    }
}

impl RecordSource for ArchiveRecordSource {
    fn load(&self, id: &ArtifactId) -> Result<LoadedRecord, CoreError> { Ok(self.load_record(id)?) }
}

/// Inputs como `- slot: id`, `- slot: [id, ...]` o `- slot: null`. Los nulos
/// se descartan; los miembros de una colección quedan como refs consecutivas
/// marcadas `collection`.
fn parse_inputs(doc: &Value, path: &Path) -> Result<Vec<InputRef<ArtifactId>>, ArchiveError> {
    let mut inputs = Vec::new();
    for item in sequence_at(doc, &["action", "inputs"]) {
        let (name, value) =
            yaml::single_entry(item).ok_or_else(|| malformed(path, "action.inputs", "expected `- slot: id` entries"))?;
        let (ids, collection): (Vec<String>, bool) = match yaml::untag(value) {
            Value::Null => (Vec::new(), false),
            Value::Sequence(items) => (items.iter().filter_map(yaml::scalar_string).collect(), true),
            other => match yaml::scalar_string(other) {
                Some(id) => (vec![id], false),
                None => return Err(malformed(path, &name, "input must be an id, a list of ids or null")),
            },
        };
        inputs.extend(ids.into_iter()
                         .map(|id| InputRef { name: name.clone(), artifact: ArtifactId::new(id), collection }));
    }
    Ok(inputs)
}

/// `environment.plugins.<name>.version`, en el orden del documento.
fn plugin_versions(doc: &Value) -> IndexMap<String, String> {
    let Some(plugins) = yaml::get(doc, &["environment", "plugins"]).and_then(|p| yaml::untag(p).as_mapping()) else {
        return IndexMap::new();
    };
    plugins.iter()
           .filter_map(|(name, entry)| {
               let version = yaml::get(entry, &["version"]).and_then(yaml::scalar_string)
                                                          .unwrap_or_else(|| UNKNOWN_VERSION.to_string());
               Some((yaml::scalar_string(name)?, version))
           })
           .collect()
}

fn sequence_at<'a>(doc: &'a Value, keys: &[&str]) -> &'a [Value] {
    yaml::get(doc, keys).and_then(|v| yaml::untag(v).as_sequence()).map(|s| s.as_slice()).unwrap_or(&[])
}

fn malformed(path: &Path, field: &str, reason: &str) -> ArchiveError {
    ArchiveError::MalformedField { path: path.to_path_buf(), field: field.to_string(), reason: reason.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{ActionSpec, ArchiveFixture};
    use pretty_assertions::assert_eq;
    use prov_core::MetadataKind;
    use serde_json::json;

    const ROOT: &str = "0b1d0f6c-7a0e-4e0c-9d6e-6a8f2c1e0001";

    fn open(fixture: &ArchiveFixture) -> ArchiveRecordSource { ArchiveRecordSource::open(fixture.root()).unwrap() }

    #[test]
    fn loads_action_with_tags_and_versions() {
        let dir = tempfile::tempdir().unwrap();
        let fx = ArchiveFixture::create(dir.path(), ROOT, "Visualization").unwrap();
        let spec = ActionSpec::new("E2", "demux", "summarize").input("data", "A")
                                                               .param("n", "10000")
                                                               .param("verbose", "false")
                                                               .param("label", "null")
                                                               .param("colors", "!set ['red', 'blue']")
                                                               .output("visualization")
                                                               .plugin("types", "0.1.0");
        fx.add_action(ROOT, "Visualization", &spec).unwrap();

        let loaded = open(&fx).load_record(&ArtifactId::from(ROOT)).unwrap();
        assert_eq!(loaded.dependencies, vec![ArtifactId::from("A")]);
        let ProvenanceRecord::Action(action) = loaded.record else { panic!("expected an action") };
        assert_eq!(action.plugin_name, "demux");
        assert_eq!(action.action_name, "summarize");
        assert_eq!(action.plugin_versions.keys().collect::<Vec<_>>(), vec!["demux", "types"]);
        assert_eq!(action.plugin_versions["types"], "0.1.0");
        let params: Vec<(&str, &serde_json::Value)> =
            action.parameters.iter().map(|p| (p.name.as_str(), &p.value)).collect();
        assert_eq!(params,
                   vec![("n", &json!(10000)),
                        ("verbose", &json!(false)),
                        ("label", &json!(null)),
                        ("colors", &json!(["red", "blue"]))]);
        assert_eq!(action.outputs,
                   vec![OutputRef { name: "visualization".into(), artifact: ArtifactId::from(ROOT) }]);
    }

    #[test]
    fn collection_inputs_flatten_and_drop_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let fx = ArchiveFixture::create(dir.path(), ROOT, "FeatureTable[Frequency]").unwrap();
        let spec = ActionSpec::new("E3", "feature-table", "merge").input_list("tables", &[Some("T1"), None, Some("T2")])
                                                                   .null_input("optional")
                                                                   .output("merged_table");
        fx.add_action(ROOT, "FeatureTable[Frequency]", &spec).unwrap();

        let loaded = open(&fx).load_record(&ArtifactId::from(ROOT)).unwrap();
        assert_eq!(loaded.dependencies, vec![ArtifactId::from("T1"), ArtifactId::from("T2")]);
        assert!(loaded.record.inputs().iter().all(|id| id.as_str() != "null"));
    }

    #[test]
    fn list_slots_stay_collections_even_with_one_member() {
        let dir = tempfile::tempdir().unwrap();
        let fx = ArchiveFixture::create(dir.path(), ROOT, "FeatureTable[Frequency]").unwrap();
        let spec = ActionSpec::new("E3", "feature-table", "merge").input_list("tables", &[Some("T1")])
                                                                   .input("reference", "T2")
                                                                   .output("merged_table");
        fx.add_action(ROOT, "FeatureTable[Frequency]", &spec).unwrap();

        let loaded = open(&fx).load_record(&ArtifactId::from(ROOT)).unwrap();
        let ProvenanceRecord::Action(action) = loaded.record else { panic!("expected an action") };
        let shape: Vec<(&str, bool)> = action.inputs.iter().map(|i| (i.name.as_str(), i.collection)).collect();
        assert_eq!(shape, vec![("tables", true), ("reference", false)]);
    }

    #[test]
    fn import_with_single_manifest_entry_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let fx = ArchiveFixture::create(dir.path(), ROOT, "Visualization").unwrap();
        fx.add_import("A", "E1", "FeatureData[Sequence]", "DNAFASTAFormat", &["seqs.fna"]).unwrap();

        let loaded = open(&fx).load_record(&ArtifactId::from("A")).unwrap();
        assert!(loaded.dependencies.is_empty());
        let ProvenanceRecord::Import(import) = loaded.record else { panic!("expected an import") };
        assert_eq!(import.input_path, "seqs.fna");
        assert_eq!(import.input_format, "DNAFASTAFormat");
        assert_eq!(import.declared_type, "FeatureData[Sequence]");
        assert_eq!(import.produced, ArtifactId::from("A"));
    }

    #[test]
    fn import_of_directory_uses_format_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let fx = ArchiveFixture::create(dir.path(), ROOT, "Visualization").unwrap();
        fx.add_import("A",
                      "E1",
                      "SampleData[SequencesWithQuality]",
                      "CasavaOneEightSingleLanePerSampleDirFmt",
                      &["MANIFEST", "metadata.yml", "S1_L001_R1_001.fastq.gz"])
          .unwrap();

        let ProvenanceRecord::Import(import) = open(&fx).load_record(&ArtifactId::from("A")).unwrap().record else {
            panic!("expected an import")
        };
        assert_eq!(import.input_path, "CasavaOneEightSingleLanePerSampleDirFmt_import_dir");
    }

    #[test]
    fn metadata_parameters_are_not_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        let fx = ArchiveFixture::create(dir.path(), ROOT, "Visualization").unwrap();
        let spec = ActionSpec::new("E2", "diversity", "alpha-group-significance")
            .input("alpha_diversity", "A")
            .metadata_param("metadata", "4f1c0000-0000-4000-8000-00000000000a:sample_metadata.tsv")
            .output("visualization");
        fx.add_action(ROOT, "Visualization", &spec).unwrap();
        fx.add_sidecar(ROOT, "sample_metadata.tsv", "sample-id\tbody-site\nS1\tgut\n").unwrap();

        let loaded = open(&fx).load_record(&ArtifactId::from(ROOT)).unwrap();
        assert_eq!(loaded.dependencies, vec![ArtifactId::from("A")]);
        let ProvenanceRecord::Action(action) = loaded.record else { panic!("expected an action") };
        assert!(action.parameters.is_empty());
        let md = &action.metadata[0];
        assert_eq!(md.name, "metadata");
        assert_eq!(md.file, "sample_metadata.tsv");
        assert_eq!(md.kind, MetadataKind::Column);
        assert!(!md.repaired);
        assert!(md.source_path.ends_with("provenance/action/sample_metadata.tsv"));
    }

    #[test]
    fn headerless_metadata_is_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let fx = ArchiveFixture::create(dir.path(), ROOT, "Visualization").unwrap();
        let spec = ActionSpec::new("E9", "emperor", "plot").input("pcoa", "P")
                                                          .metadata_param("metadata", "md.tsv")
                                                          .output("visualization");
        fx.add_action("B", "Visualization", &spec).unwrap();
        fx.add_sidecar("B", "md.tsv", "S1\tgut\t1\nS2\ttongue\t2\n").unwrap();

        let ProvenanceRecord::Action(action) = open(&fx).load_record(&ArtifactId::from("B")).unwrap().record else {
            panic!("expected an action")
        };
        assert!(action.metadata[0].repaired);
        assert_eq!(action.metadata[0].kind, MetadataKind::Full);
    }

    #[test]
    fn legacy_output_name_uses_metadata_uuid() {
        let dir = tempfile::tempdir().unwrap();
        let fx = ArchiveFixture::create(dir.path(), ROOT, "Visualization").unwrap();
        let spec = ActionSpec::new("E5", "dada2", "denoise-single").input("demultiplexed_seqs", "A");
        fx.add_action("B", "FeatureTable[Frequency]", &spec).unwrap();
        fx.override_metadata_uuid("B", "FeatureTable[Frequency]", "B-from-metadata").unwrap();

        let loaded = open(&fx).load_record(&ArtifactId::from("B")).unwrap();
        assert_eq!(loaded.record.outputs(), vec![&ArtifactId::from("B-from-metadata")]);
        let ProvenanceRecord::Action(action) = loaded.record else { panic!("expected an action") };
        assert_eq!(action.outputs[0].name, "legacy-unnamed");
    }

    #[test]
    fn missing_record_maps_to_core_error() {
        let dir = tempfile::tempdir().unwrap();
        let fx = ArchiveFixture::create(dir.path(), ROOT, "Visualization").unwrap();
        let source = open(&fx);

        let err = source.load(&ArtifactId::from("ghost")).unwrap_err();
        assert!(matches!(err, CoreError::MissingRecord(id) if id.as_str() == "ghost"));
    }

    #[test]
    fn malformed_yaml_is_a_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let fx = ArchiveFixture::create(dir.path(), ROOT, "Visualization").unwrap();
        fx.add_sidecar(ROOT, "action.yaml", "execution: [unterminated\n").unwrap();

        let err = open(&fx).load(&ArtifactId::from(ROOT)).unwrap_err();
        assert!(matches!(err, CoreError::Source(_)));
    }

    #[test]
    fn resolves_a_full_archive() {
        let dir = tempfile::tempdir().unwrap();
        let fx = ArchiveFixture::create(dir.path(), ROOT, "Visualization").unwrap();
        fx.add_import("A", "E1", "SampleData[SequencesWithQuality]", "SingleLanePerSampleSingleEndFastqDirFmt", &[])
          .unwrap();
        fx.add_action(ROOT, "Visualization", &ActionSpec::new("E2", "demux", "summarize").input("data", "A")
                                                                                          .output("visualization"))
          .unwrap();

        let source = open(&fx);
        let sequence = prov_core::resolve(&source, source.root_id(), Default::default()).unwrap();
        assert_eq!(sequence.len(), 2);
        assert!(sequence.iter().next().unwrap().is_import());
    }
}
