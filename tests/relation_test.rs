mod common;

use common::{service, vocab, Experiment, Study, Unit, Variable};
use samyama_ogm::mapping::RelationState;
use samyama_ogm::rdf::namespace::rdfs;
use samyama_ogm::{Label, LazyList, LazyRelation, OgmError, SparqlResource};

#[test]
fn test_label_translations() {
    let service = service();
    let builder = service.index().builder_of::<Variable>().unwrap();

    let mut variable = Variable::new(Label::of("en", "Leaf area").with_translation("fr", "Surface foliaire"));
    variable.comment = Some(Label::of("en", "Measured on the third leaf"));

    let mut with_uri = variable.clone();
    with_uri.set_uri(vocab("leaf-area"));
    let create = builder.build_create(None, &with_uri.to_values()).unwrap();
    let labels = create
        .inserted_quads()
        .filter(|q| q.predicate.as_named_node().as_str() == rdfs::LABEL)
        .count();
    assert_eq!(labels, 2);

    service.create(&mut variable).unwrap();
    let uri = variable.uri.clone().unwrap();
    assert_eq!(uri.as_str(), "http://test.samyama.org/id/variable/Leaf_area");

    let french: Variable = service.get_by_uri(&uri, Some("fr")).unwrap().unwrap();
    assert_eq!(french.name.get("fr"), Some("Surface foliaire"));
    assert_eq!(french.name.get("en"), None);
    assert!(french.comment.is_none());

    let english: Variable = service.get_by_uri(&uri, Some("en")).unwrap().unwrap();
    assert_eq!(english.name.get("en"), Some("Leaf area"));
    assert_eq!(
        english.comment.unwrap().get("en"),
        Some("Measured on the third leaf")
    );

    // default language of the configuration
    let default: Variable = service.get_by_uri(&uri, None).unwrap().unwrap();
    assert_eq!(default.name.get("en"), Some("Leaf area"));

    assert!(matches!(
        service.get_by_uri::<Variable>(&uri, Some("de")),
        Err(OgmError::MissingRequiredField { .. })
    ));
}

#[test]
fn test_update_keeps_other_translations_when_reloaded_without_language() {
    let service = service();
    let mut variable = Variable::new(Label::of("en", "Height").with_translation("fr", "Hauteur"));
    variable.synonyms = vec!["stature".to_string()];
    service.create(&mut variable).unwrap();

    variable.name.add_translation("es", "Altura");
    service.update(&variable).unwrap();

    let spanish: Variable = service.get_by_uri(variable.uri.as_ref().unwrap(), Some("es")).unwrap().unwrap();
    assert_eq!(spanish.name.get("es"), Some("Altura"));
    assert_eq!(spanish.synonyms, vec!["stature".to_string()]);
    let french: Variable = service.get_by_uri(variable.uri.as_ref().unwrap(), Some("fr")).unwrap().unwrap();
    assert_eq!(french.name.get("fr"), Some("Hauteur"));
}

#[test]
fn test_lazy_relation_resolves_through_service() {
    let service = service();
    let mut unit = Unit::new("cm2");
    service.create(&mut unit).unwrap();

    let mut variable = Variable::new(Label::of("en", "Leaf surface"));
    variable.unit = Some(LazyRelation::loaded(unit.clone()));
    service.create(&mut variable).unwrap();

    let loaded: Variable = service.get_by_uri(variable.uri.as_ref().unwrap(), None).unwrap().unwrap();
    let relation = loaded.unit.as_ref().unwrap();
    assert_eq!(relation.uri(), unit.uri.as_ref());
    assert_eq!(relation.state(), RelationState::Unloaded);
    assert!(relation.get().is_none());

    let related = relation.resolve(&service).unwrap().unwrap();
    assert_eq!(related, &unit);
    assert_eq!(relation.state(), RelationState::Loaded);
}

#[test]
fn test_unresolved_reference_on_create() {
    let service = service();
    let mut variable = Variable::new(Label::of("en", "Biomass"));
    variable.unit = Some(LazyRelation::loaded(Unit::new("g")));
    assert!(matches!(
        service.create(&mut variable),
        Err(OgmError::UnresolvedReference { .. })
    ));

    // the failed creation released its URI
    variable.unit = None;
    variable.uri = None;
    service.create(&mut variable).unwrap();
    assert_eq!(
        variable.uri.unwrap().as_str(),
        "http://test.samyama.org/id/variable/Biomass"
    );
}

#[test]
fn test_reverse_relation_list() {
    let service = service();
    let mut study = Study {
        uri: None,
        title: "Drought tolerance".to_string(),
        experiments: LazyList::default(),
    };
    service.create(&mut study).unwrap();

    let mut experiments = vec![Experiment::new("field 2023"), Experiment::new("field 2024")];
    for experiment in experiments.iter_mut() {
        experiment.study = Some(LazyRelation::loaded(study.clone()));
    }
    service.create_all(&mut experiments).unwrap();
    assert_ne!(experiments[0].uri, experiments[1].uri);

    let loaded: Study = service.get_by_uri(study.uri.as_ref().unwrap(), None).unwrap().unwrap();
    let key = loaded.experiments.key().unwrap();
    assert!(key.reverse);
    let mut names: Vec<_> = loaded
        .experiments
        .resolve(&service)
        .unwrap()
        .iter()
        .map(|e| e.name.clone())
        .collect();
    names.sort();
    assert_eq!(names, vec!["field 2023", "field 2024"]);

    service
        .delete_object_relation(
            None,
            experiments[0].uri.as_ref().unwrap(),
            &vocab("partOf"),
            study.uri.as_ref().unwrap(),
        )
        .unwrap();
    let reloaded: Study = service.get_by_uri(study.uri.as_ref().unwrap(), None).unwrap().unwrap();
    assert_eq!(reloaded.experiments.resolve(&service).unwrap().len(), 1);
}

#[test]
fn test_deleting_owner_removes_reverse_triples() {
    let service = service();
    let mut study = Study {
        uri: None,
        title: "Nitrogen".to_string(),
        experiments: LazyList::default(),
    };
    service.create(&mut study).unwrap();

    let mut experiment = Experiment::new("greenhouse");
    experiment.study = Some(LazyRelation::loaded(study.clone()));
    service.create(&mut experiment).unwrap();

    service.delete::<Study>(study.uri.as_ref().unwrap()).unwrap();
    assert!(!service.uri_exists(study.uri.as_ref().unwrap()).unwrap());

    let orphan: Experiment = service
        .get_by_uri(experiment.uri.as_ref().unwrap(), None)
        .unwrap()
        .unwrap();
    assert!(orphan.study.is_none());
}

#[test]
fn test_content_hash_uri_is_stable() {
    let service = service();
    let mut first = Experiment::new("plot 7");
    service.create(&mut first).unwrap();
    let uri = first.uri.clone().unwrap();
    assert!(uri.as_str().starts_with("http://test.samyama.org/id/experiment/"));

    // same key fields hash to the same candidate, the retry suffix disambiguates
    let mut second = Experiment::new("plot 7");
    service.create(&mut second).unwrap();
    assert_eq!(second.uri.unwrap().as_str(), format!("{}-1", uri.as_str()));
}
