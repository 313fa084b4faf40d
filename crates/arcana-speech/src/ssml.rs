//! Renders a structured reading into SSML narration markup.
//!
//! Pacing: a slowed, raised introduction, per-card emphasis blocks with
//! graded pauses, a synthesis, enumerated actionable points, and a slowed,
//! lowered conclusion.

use arcana_schema::TarotReadingResponse;

pub fn render(reading: &TarotReadingResponse) -> String {
    let mut ssml = String::from("<speak>");

    ssml.push_str(&format!(
        "<prosody rate=\"slow\" pitch=\"+2st\"><p>{}</p></prosody>",
        reading.introduction
    ));
    ssml.push_str("<break time=\"1s\"/>");

    ssml.push_str("<p>Here are the insights from your cards:</p>");
    ssml.push_str("<break time=\"700ms\"/>");

    for (index, card) in reading.cards_interpretation.iter().enumerate() {
        if index == 0 {
            ssml.push_str("<break time=\"1s\"/>");
        } else {
            ssml.push_str("<break time=\"800ms\"/>");
        }
        ssml.push_str(&format!(
            "<p><emphasis level=\"strong\">Card {}: {} in the {} position.</emphasis>\
             <break time=\"300ms\"/>\
             <prosody rate=\"medium\">{}</prosody></p>",
            index + 1,
            card.card_name,
            card.position,
            card.interpretation
        ));
    }

    ssml.push_str("<break time=\"1.5s\"/>");
    ssml.push_str(&format!(
        "<p><emphasis level=\"moderate\">Let's synthesize what these cards mean together.</emphasis>\
         <break time=\"500ms\"/>\
         <prosody rate=\"medium\" pitch=\"-1st\">{}</prosody></p>",
        reading.overall_synthesis
    ));
    ssml.push_str("<break time=\"1.5s\"/>");

    ssml.push_str(&format!(
        "<p><emphasis level=\"strong\">Now for some actionable guidance:</emphasis>\
         <break time=\"500ms\"/>\
         <prosody rate=\"slow\">{}</prosody></p>",
        reading.actionable_summary.intro
    ));
    ssml.push_str("<break time=\"800ms\"/>");

    for (index, point) in reading.actionable_summary.points.iter().enumerate() {
        ssml.push_str(&format!(
            "<p><prosody rate=\"slow\">Point {}: <break time=\"150ms\"/> {}</prosody></p>",
            index + 1,
            point
        ));
        ssml.push_str("<break time=\"600ms\"/>");
    }

    ssml.push_str("<break time=\"1.5s\"/>");
    ssml.push_str(&format!(
        "<p><prosody rate=\"slow\" pitch=\"-2st\">{}</prosody></p>",
        reading.conclusion
    ));

    ssml.push_str("</speak>");
    ssml
}
