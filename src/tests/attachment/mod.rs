use serde_json::json;

use crate::{
    config::{MappingTag, Options, TableConfig},
    node::{Node, NodeId},
    tests::{FakeMaterializer, FakeSource, parents, pipeline, row},
};

const LOGO: &str = "https://files.example.com/logo.png";

fn gallery_table() -> TableConfig {
    let mut table = TableConfig::new("appPhotos", "Gallery");
    table.mapping.insert("Photos".into(), MappingTag::File);
    table
}

#[tokio::test]
async fn failed_attachment_is_dropped_and_reported() {
    let source = FakeSource::default().with_table(
        "appPhotos",
        "Gallery",
        vec![row(
            "recG",
            json!({
                "Photos": [
                    { "id": "attOk", "url": "https://files.example.com/ok.jpg", "filename": "ok.jpg", "type": "image/jpeg" },
                    { "url": "https://files.example.com/broken.jpg", "filename": "broken.jpg" }
                ]
            }),
        )],
    );
    let pipeline = pipeline(
        source,
        FakeMaterializer::failing(&["https://files.example.com/broken.jpg"]),
    );
    let report = pipeline
        .run(&Options::new("keyTEST", vec![gallery_table()]))
        .await
        .unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("broken.jpg"));

    let nodes = pipeline.sink.collect();
    let child = nodes.iter().find_map(Node::as_child).unwrap();
    assert_eq!(child.id, NodeId::child("recG", "Photos"));
    assert_eq!(
        child.local_files,
        Some(vec![NodeId::file(&child.id, "https://files.example.com/ok.jpg")])
    );
    assert_eq!(child.internal.node_type, "AirtableField");
    assert_eq!(child.internal.media_type.as_deref(), Some("fileNode"));

    let files = nodes.iter().filter_map(Node::as_file).collect::<Vec<_>>();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].parent, child.id);
    assert_eq!(files[0].id, child.local_files.as_ref().unwrap()[0]);
    assert_eq!(files[0].attachment_id.as_deref(), Some("attOk"));
    assert_eq!(files[0].url, "https://files.example.com/ok.jpg");
    assert_eq!(files[0].internal.node_type, "File");
    assert_eq!(files[0].internal.media_type.as_deref(), Some("image/jpeg"));
}

#[tokio::test]
async fn separate_map_type_names_file_children() {
    let mut table = gallery_table();
    table.separate_map_type = true;
    let source = FakeSource::default().with_table(
        "appPhotos",
        "Gallery",
        vec![row(
            "recG",
            json!({ "Photos": [{ "url": "https://files.example.com/a.jpg" }] }),
        )],
    );
    let pipeline = pipeline(source, FakeMaterializer::default());
    pipeline
        .run(&Options::new("keyTEST", vec![table]))
        .await
        .unwrap();
    let nodes = pipeline.sink.collect();
    let child = nodes.iter().find_map(Node::as_child).unwrap();
    assert_eq!(child.internal.node_type, "AirtableFieldfileNode");
}

#[tokio::test]
async fn empty_attachment_field_has_no_files() {
    let source = FakeSource::default().with_table(
        "appPhotos",
        "Gallery",
        vec![row("recG", json!({ "Photos": null, "Caption": "none yet" }))],
    );
    let pipeline = pipeline(source, FakeMaterializer::default());
    let report = pipeline
        .run(&Options::new("keyTEST", vec![gallery_table()]))
        .await
        .unwrap();
    assert!(report.warnings.is_empty());
    assert_eq!(report.nodes, 2);

    let nodes = pipeline.sink.collect();
    let child = nodes.iter().find_map(Node::as_child).unwrap();
    assert_eq!(child.local_files, Some(Vec::new()));
    assert_eq!(child.internal.content.as_deref(), Some("null"));
    assert!(nodes.iter().all(|node| node.as_file().is_none()));
    assert_eq!(parents(&nodes)[0].data["Caption"], json!("none yet"));
}

#[tokio::test]
async fn malformed_attachment_is_skipped_with_warning() {
    let source = FakeSource::default().with_table(
        "appPhotos",
        "Gallery",
        vec![row(
            "recG",
            json!({ "Photos": [{ "filename": "missing-url.jpg" }, { "url": "https://files.example.com/b.jpg" }] }),
        )],
    );
    let pipeline = pipeline(source, FakeMaterializer::default());
    let report = pipeline
        .run(&Options::new("keyTEST", vec![gallery_table()]))
        .await
        .unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("`Photos`"));
    let nodes = pipeline.sink.collect();
    assert_eq!(nodes.iter().filter_map(Node::as_file).count(), 1);
}

#[tokio::test]
async fn shared_url_gets_one_file_node_per_owner() {
    let source = FakeSource::default().with_table(
        "appPhotos",
        "Gallery",
        vec![
            row("recG1", json!({ "Photos": [{ "url": LOGO }] })),
            row("recG2", json!({ "Photos": [{ "url": LOGO }] })),
        ],
    );
    let pipeline = pipeline(source, FakeMaterializer::default());
    pipeline
        .run(&Options::new("keyTEST", vec![gallery_table()]))
        .await
        .unwrap();
    let nodes = pipeline.sink.collect();

    let files = nodes.iter().filter_map(Node::as_file).collect::<Vec<_>>();
    assert_eq!(files.len(), 2);
    assert_ne!(files[0].id, files[1].id);
    for child in nodes.iter().filter_map(Node::as_child) {
        let owned = files
            .iter()
            .filter(|file| file.parent == child.id)
            .map(|file| file.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(child.local_files.as_ref(), Some(&owned));
        assert_eq!(owned, vec![NodeId::file(&child.id, LOGO)]);
    }
}

#[tokio::test]
async fn attachments_of_one_field_resolve_concurrently() {
    let source = FakeSource::default().with_table(
        "appPhotos",
        "Gallery",
        vec![row(
            "recG",
            json!({
                "Photos": [
                    { "url": "https://files.example.com/1.jpg" },
                    { "url": "https://files.example.com/2.jpg" },
                    { "url": "https://files.example.com/3.jpg" }
                ]
            }),
        )],
    );
    let mut options = Options::new("keyTEST", vec![gallery_table()]);
    options.concurrency = Some(1);
    let pipeline = pipeline(source, FakeMaterializer::default());
    let report = pipeline.run(&options).await.unwrap();
    assert_eq!(report.nodes, 5);
    assert_eq!(pipeline.materializer.peak(), 3);

    let nodes = pipeline.sink.collect();
    let urls = nodes
        .iter()
        .filter_map(Node::as_file)
        .map(|file| file.url.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        urls,
        vec![
            "https://files.example.com/1.jpg",
            "https://files.example.com/2.jpg",
            "https://files.example.com/3.jpg"
        ]
    );
}
