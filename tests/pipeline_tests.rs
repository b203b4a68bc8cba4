mod common;

use base64::{engine::general_purpose, Engine as _};
use common::{entries, json_file_request, FakeEngine, RENDERED, SIGNED};
use reports_api::generator::{
    EngineDatasource, EngineValue, ExporterConfig, ExporterPropertyMapper, GenerationState,
    Generator, GeneratorContext, GeneratorError, ReportOutput,
};
use reports_api::request::{
    Metadata, Parameter, ParameterType, PdfProperties, ReportFormat, Sign, SignRectangle,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn context(base: &Path, engine: Arc<FakeEngine>, keystore_dir: &Path) -> GeneratorContext {
    GeneratorContext {
        tmp_dir: Some(base.to_path_buf()),
        engine,
        printer: None,
        mapper: ExporterPropertyMapper::with_keystore_path(keystore_dir.join("keystore.ks")),
    }
}

#[tokio::test]
async fn test_pdf_with_json_file_datasource() {
    let base = tempdir().unwrap();
    let keystore_dir = tempdir().unwrap();
    let engine = Arc::new(FakeEngine::default());
    let mut generator = Generator::new(context(base.path(), engine.clone(), keystore_dir.path()));

    let mut request = json_file_request(ReportFormat::Pdf);
    request.parameters = vec![
        Parameter::new(ParameterType::String, "COMPANY", "Rebelo"),
        Parameter::new(ParameterType::Bool, "PAID", "yes"),
        Parameter::new(ParameterType::SqlDate, "DAY", "2024-02-29"),
    ];
    request.metadata = Some(Metadata {
        title: Some("Invoice".to_string()),
        display_metadata_title: true,
        ..Default::default()
    });
    request.pdf_properties = Some(PdfProperties {
        permissions: Some(0),
        ..Default::default()
    });

    let output = generator.generate(&request).unwrap();
    assert_eq!(
        output,
        ReportOutput::Document(general_purpose::STANDARD.encode(RENDERED))
    );
    assert_eq!(generator.state(), GenerationState::Encoded);

    {
        let rendered = engine.rendered.lock();
        let properties = &rendered[0];
        assert_eq!(properties.format, ReportFormat::Pdf);
        assert_eq!(properties.copies, 1);
        assert_eq!(properties.parameters["PAID"], EngineValue::Bool(true));
        assert!(matches!(
            properties.datasource,
            EngineDatasource::File { .. }
        ));
        match &properties.exporter {
            ExporterConfig::Pdf(pdf) => {
                assert_eq!(pdf.permissions, Some(3900));
                assert_eq!(pdf.metadata_title.as_deref(), Some("Invoice"));
                assert_eq!(pdf.metadata_author.as_deref(), Some(""));
                assert!(pdf.display_metadata_title);
                assert!(!pdf.sign_pdf);
            }
            other => panic!("unexpected exporter {:?}", other),
        }
    }

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(entries(base.path()), 0);
}

#[tokio::test]
async fn test_missing_keystore_is_parse_error_and_workspace_removed() {
    let base = tempdir().unwrap();
    let keystore_dir = tempdir().unwrap();
    let engine = Arc::new(FakeEngine::default());
    let mut generator = Generator::new(context(base.path(), engine.clone(), keystore_dir.path()));

    let mut request = json_file_request(ReportFormat::Pdf);
    request.sign = Some(Sign::default());

    let err = generator.generate(&request).unwrap_err();
    assert!(matches!(err, GeneratorError::Parse(_)));
    let expected = keystore_dir.path().join("keystore.ks");
    assert_eq!(
        err.to_string(),
        format!("Keystore file '{}' not found.", expected.display())
    );
    assert_eq!(generator.state(), GenerationState::Failed);
    assert!(engine.rendered.lock().is_empty());

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(entries(base.path()), 0);
}

#[tokio::test]
async fn test_signed_pdf() {
    let base = tempdir().unwrap();
    let keystore_dir = tempdir().unwrap();
    std::fs::write(keystore_dir.path().join("keystore.ks"), b"keystore").unwrap();
    let engine = Arc::new(FakeEngine::default());
    let mut generator = Generator::new(context(base.path(), engine.clone(), keystore_dir.path()));

    let mut request = json_file_request(ReportFormat::Pdf);
    request.sign = Some(Sign {
        certificate_name: "rebelo".to_string(),
        sign_rectangle: Some(SignRectangle {
            x: 100,
            y: 10,
            width: 200,
            height: 40,
            rotation: 0,
        }),
        ..Default::default()
    });

    let output = generator.generate(&request).unwrap();
    assert_eq!(
        output,
        ReportOutput::Document(general_purpose::STANDARD.encode(SIGNED))
    );

    let signed = engine.signed.lock();
    let (source, destination, config) = &signed[0];
    assert!(source.ends_with("output"));
    assert!(destination.ends_with("output_sign"));
    assert_eq!(config.certificate_name, "rebelo");
    let rectangle = config.rectangle.unwrap();
    assert_eq!(
        (rectangle.left, rectangle.bottom, rectangle.right, rectangle.top),
        (100, 50, 300, 10)
    );
}

#[tokio::test]
async fn test_engine_failure_surfaces_message() {
    let base = tempdir().unwrap();
    let keystore_dir = tempdir().unwrap();
    let engine = Arc::new(FakeEngine::failing("Template is corrupted"));
    let mut generator = Generator::new(context(base.path(), engine, keystore_dir.path()));

    let err = generator
        .generate(&json_file_request(ReportFormat::Docx))
        .unwrap_err();

    assert!(matches!(err, GeneratorError::Render(_)));
    assert_eq!(err.to_string(), "Template is corrupted");
}

#[tokio::test]
async fn test_bad_parameter_aborts_before_rendering() {
    let base = tempdir().unwrap();
    let keystore_dir = tempdir().unwrap();
    let engine = Arc::new(FakeEngine::default());
    let mut generator = Generator::new(context(base.path(), engine.clone(), keystore_dir.path()));

    let mut request = json_file_request(ReportFormat::Html);
    request.parameters = vec![Parameter::new(
        ParameterType::Unknown("P_OBJECT".to_string()),
        "X",
        "1",
    )];

    let err = generator.generate(&request).unwrap_err();
    assert_eq!(err.to_string(), "The parameter type 'P_OBJECT' not exist");
    assert!(engine.rendered.lock().is_empty());
}

#[tokio::test]
async fn test_all_default_request_fails_gracefully() {
    let base = tempdir().unwrap();
    let keystore_dir = tempdir().unwrap();
    let mut generator = Generator::new(context(
        base.path(),
        Arc::new(FakeEngine::default()),
        keystore_dir.path(),
    ));

    let err = generator
        .generate(&reports_api::request::ReportRequest::default())
        .unwrap_err();
    assert!(matches!(err, GeneratorError::DataSource(_)));
    assert_eq!(err.to_string(), "No datasource defined in Report Request");
    assert_eq!(generator.state(), GenerationState::Failed);
}

#[test]
fn test_generation_outside_runtime_still_cleans_up() {
    let base = tempdir().unwrap();
    let keystore_dir = tempdir().unwrap();
    let mut generator = Generator::new(context(
        base.path(),
        Arc::new(FakeEngine::default()),
        keystore_dir.path(),
    ));

    generator
        .generate(&json_file_request(ReportFormat::Csv))
        .unwrap();

    std::thread::sleep(Duration::from_secs(1));
    assert_eq!(entries(base.path()), 0);
}
