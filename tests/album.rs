#[path = "support/rewriters.rs"]
mod rewriters;

use std::sync::Arc;
use std::time::Duration;

use postwright::links::units::utf16_slice;
use postwright::{
    Aggregation, GroupAggregator, IncomingPost, LinkAnnotation, RewritePipeline, primary_text,
};
use rewriters::{Echo, span};

fn album_part(message_id: i64, caption: Option<&str>) -> IncomingPost {
    let caption_entities = caption
        .map(|c| {
            let (at, len) = span(c, "here");
            vec![LinkAnnotation::anchored(at, len, "https://shop.example/item?utm_campaign=drop")]
        })
        .unwrap_or_default();
    IncomingPost {
        message_id,
        media_group_id: Some("album-1".into()),
        caption: caption.map(String::from),
        caption_entities,
        ..IncomingPost::default()
    }
}

#[tokio::test(start_paused = true)]
async fn album_parts_arriving_out_of_order_are_rewritten_once() {
    let aggregator = Arc::new(GroupAggregator::new(
        Duration::from_millis(500),
        Duration::from_secs(60),
    ));

    let opener = tokio::spawn({
        let aggregator = aggregator.clone();
        async move { aggregator.aggregate(album_part(12, None)).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let late = [album_part(10, Some("New drop, get it here")), album_part(11, None)];
    for part in late {
        assert_eq!(aggregator.aggregate(part).await, Aggregation::Buffered);
    }

    let batch = opener.await.unwrap().into_batch().unwrap();
    let ids: Vec<i64> = batch.iter().map(|p| p.message_id).collect();
    assert_eq!(ids, [10, 11, 12]);
    assert_eq!(aggregator.buffered_groups(), 0);

    let text = primary_text(&batch).unwrap();
    let out = RewritePipeline::new(Arc::new(Echo), "rules")
        .run(&text)
        .await
        .unwrap();

    assert_eq!(out.text, "New drop, get it here");
    let link = &out.links[0];
    assert_eq!(utf16_slice(&out.text, link.offset, link.length), Some("here"));
    assert_eq!(link.url.as_deref(), Some("https://shop.example/item"));
}

#[tokio::test(start_paused = true)]
async fn standalone_post_is_not_delayed() {
    let aggregator: GroupAggregator<IncomingPost> =
        GroupAggregator::new(Duration::from_millis(500), Duration::from_secs(60));
    let post = IncomingPost {
        message_id: 1,
        text: Some("hello".into()),
        ..IncomingPost::default()
    };

    let started = tokio::time::Instant::now();
    let Aggregation::Ungrouped(back) = aggregator.aggregate(post.clone()).await else {
        panic!("standalone post was buffered");
    };
    assert_eq!(back, post);
    assert_eq!(started.elapsed(), Duration::ZERO);
}
