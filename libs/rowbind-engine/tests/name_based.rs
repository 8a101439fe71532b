mod common;

use rowbind_api::{AutoConstruct, MappingErrorKind, RowQuery, RowSource};
use rowbind_engine::{
    ConstructorResolver, EngineError, MemoryRowSource, ResultMapper, SelectionRule, SessionFactory,
};

use common::{config, factory, fixture, ExtensiveSubject, Subject, SubjectSummary};

fn name_based_factory(underscore_to_camel_case: bool) -> SessionFactory {
    let mut config = config();
    config.settings.arg_name_based_constructor_auto_mapping = true;
    config.settings.map_underscore_to_camel_case = underscore_to_camel_case;
    SessionFactory::from_config(config).unwrap()
}

#[test]
fn parameters_bind_by_name_and_declared_column() {
    let session = name_based_factory(false).open_session();
    let summaries: Vec<SubjectSummary> = session.select_list("getSubjects", None).unwrap();
    assert_eq!(summaries.len(), 3);
    assert_eq!(summaries[1].id, 2);
    assert_eq!(summaries[1].label.as_deref(), Some("b"));
    assert_eq!(summaries[1].age, 10);
}

#[test]
fn positional_mode_rejects_the_same_type() {
    let err = factory()
        .open_session()
        .select_list::<SubjectSummary>("getSubjects", None)
        .unwrap_err();
    let kind = err.mapping_error().map(|e| e.kind);
    assert_eq!(kind, Some(MappingErrorKind::NoMatchingConstructor));
    assert!(err.to_string().contains("Summary"), "{err}");
}

#[test]
fn snake_case_parameters_need_the_camel_case_setting() {
    let strict = name_based_factory(false).open_session();
    let err = strict
        .select_list::<ExtensiveSubject>("getExtensiveSubjects", None)
        .unwrap_err();
    assert_eq!(
        err.mapping_error().map(|e| e.kind),
        Some(MappingErrorKind::NoMatchingConstructor)
    );

    // Both constructors find all their columns by name.
    let relaxed = name_based_factory(true).open_session();
    let err = relaxed
        .select_list::<ExtensiveSubject>("getExtensiveSubjects", None)
        .unwrap_err();
    assert_eq!(
        err.mapping_error().map(|e| e.kind),
        Some(MappingErrorKind::AmbiguousConstructor)
    );
}

#[test]
fn descriptor_is_built_once() {
    assert!(std::ptr::eq(Subject::descriptor(), Subject::descriptor()));
    let names: Vec<&str> = ExtensiveSubject::descriptor()
        .constructors()
        .iter()
        .map(|c| c.name())
        .collect();
    assert_eq!(names, vec!["new", "short"]);
    assert_eq!(SubjectSummary::descriptor().type_name(), "Summary");
}

#[test]
fn resolution_is_idempotent() {
    let source = MemoryRowSource::load(fixture("autoconstructor.json")).unwrap();
    let rs = source.fetch(&RowQuery::table("subject").limit(1)).unwrap();
    let resolver = ConstructorResolver::default();
    let first: Subject = resolver.resolve(Subject::descriptor(), &rs.schema, &rs.rows[0]).unwrap();
    let second: Subject = resolver.resolve(Subject::descriptor(), &rs.schema, &rs.rows[0]).unwrap();
    assert_eq!(first, second);

    let selected = resolver.select(Subject::descriptor(), &rs.schema).unwrap();
    assert_eq!(selected.rule(), SelectionRule::SingleConstructor);
}

#[test]
fn concurrent_mapping_agrees() {
    let source = MemoryRowSource::load(fixture("autoconstructor.json")).unwrap();
    let rs = source.fetch(&RowQuery::table("extensive_subject")).unwrap();
    let mapper = ResultMapper::default();
    let expected: Vec<ExtensiveSubject> = mapper.map_all(&rs).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| mapper.map_all::<ExtensiveSubject>(&rs)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), expected);
        }
    });
}

#[test]
fn missing_dataset_is_a_config_error() {
    let mut config = config();
    config.dataset = None;
    assert!(matches!(
        SessionFactory::from_config(config),
        Err(EngineError::Config(_))
    ));
}
