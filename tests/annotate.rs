use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use felt::notify::SerialLink;
use felt::{Annotator, EmotionAnnotator, EmotionScore};
use image::{ImageFormat, RgbImage};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn score(label: &str, value: f32) -> EmotionScore {
    EmotionScore {
        label: label.into(),
        score: value,
    }
}

fn black_frame_png() -> Vec<u8> {
    let img = RgbImage::new(640, 480);
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

#[tokio::test]
async fn annotates_the_frame_and_sends_the_dominant_emotion() {
    let wire = SharedBuf::default();
    let annotator = EmotionAnnotator::new(SerialLink::with_writer(Box::new(wire.clone())));
    let scores = [score("happy", 90.0), score("sad", 10.0)];
    let frame = black_frame_png();

    let reply = annotator.annotate(&scores, &frame).await.unwrap();
    assert_eq!(wire.contents(), b"happy\n");
    assert_ne!(reply, frame);

    let annotated = image::load_from_memory(&reply).unwrap().to_rgb8();
    // happy bar in row 0, sad bar in row 1, both tracks outlined in white
    assert_eq!(annotated.get_pixel(200, 25).0, [239, 151, 27]);
    assert_eq!(annotated.get_pixel(160, 65).0, [4, 119, 186]);
    assert_eq!(annotated.get_pixel(150, 15).0, [255, 255, 255]);
    assert_eq!(annotated.get_pixel(400, 75).0, [255, 255, 255]);
}

#[tokio::test]
async fn a_second_frame_inside_the_window_is_not_sent() {
    let wire = SharedBuf::default();
    let annotator = EmotionAnnotator::new(SerialLink::with_writer(Box::new(wire.clone())));
    let scores = [score("happy", 90.0), score("sad", 10.0)];
    let frame = black_frame_png();

    annotator.annotate(&scores, &frame).await.unwrap();
    annotator.annotate(&scores, &frame).await.unwrap();
    assert_eq!(wire.contents(), b"happy\n");
}

#[tokio::test]
async fn empty_scores_change_nothing() {
    let wire = SharedBuf::default();
    let annotator = EmotionAnnotator::new(SerialLink::with_writer(Box::new(wire.clone())));
    let frame = black_frame_png();

    let reply = annotator.annotate(&[], &frame).await.unwrap();
    assert!(wire.contents().is_empty());

    let annotated = image::load_from_memory(&reply).unwrap().to_rgb8();
    assert_eq!(annotated, RgbImage::new(640, 480));
}

#[tokio::test]
async fn offline_link_still_annotates() {
    let annotator = EmotionAnnotator::new(SerialLink::offline());
    let scores = [score("fear", 70.0)];
    let frame = black_frame_png();

    let reply = annotator.annotate(&scores, &frame).await.unwrap();
    let annotated = image::load_from_memory(&reply).unwrap().to_rgb8();
    assert_eq!(annotated.get_pixel(200, 25).0, [146, 37, 128]);
}

#[tokio::test]
async fn closing_the_link_stops_notifications_but_not_drawing() {
    let wire = SharedBuf::default();
    let annotator = EmotionAnnotator::new(SerialLink::with_writer(Box::new(wire.clone())));
    annotator.close().await;
    annotator.close().await;

    let scores = [score("angry", 55.0)];
    let reply = annotator.annotate(&scores, &black_frame_png()).await.unwrap();
    assert!(wire.contents().is_empty());

    let annotated = image::load_from_memory(&reply).unwrap().to_rgb8();
    assert_eq!(annotated.get_pixel(200, 25).0, [220, 50, 35]);
}
