use crate::conversation::Role;
use crate::image::ImageAttachment;
use crate::message::content::{ContentPart, DialogueMessage, WireMessage};
use crate::prompt::VISION_SYSTEM_PROMPT;

/// Build the `messages` array for one exchange.
///
/// Order is fixed: the system instruction, then the replayed dialogue context with
/// roles preserved, then one user message holding the image followed by the query.
/// The model reads the image before the question.
pub fn build_request(
    context: &[DialogueMessage],
    image: &ImageAttachment,
    query: &str,
) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(context.len() + 2);
    messages.push(WireMessage::text(Role::System, VISION_SYSTEM_PROMPT));
    messages.extend(context.iter().map(WireMessage::from));
    messages.push(WireMessage {
        role: Role::User,
        content: vec![
            ContentPart::image_url(image.data_uri()),
            ContentPart::text(query),
        ],
    });
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::test_support::png_bytes;

    fn image() -> ImageAttachment {
        ImageAttachment::from_upload(&png_bytes([9, 9, 9]), "cat.png").unwrap()
    }

    #[test]
    fn empty_context_yields_system_then_image_query() {
        let image = image();
        let messages = build_request(&[], &image, "what is this");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].as_text(), VISION_SYSTEM_PROMPT);

        let last = &messages[1];
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content.len(), 2);
        assert_eq!(last.content[0], ContentPart::image_url(image.data_uri()));
        assert_eq!(last.content[1], ContentPart::text("what is this"));
    }

    #[test]
    fn context_roles_and_order_are_preserved() {
        let image = image();
        let context = vec![
            DialogueMessage::new(Role::User, "what is this"),
            DialogueMessage::new(Role::Assistant, "A cat."),
            DialogueMessage::new(Role::User, "what color?"),
            DialogueMessage::new(Role::Assistant, "Orange."),
        ];
        let messages = build_request(&context, &image, "is it sleeping?");

        assert_eq!(messages.len(), context.len() + 2);
        for (wire, original) in messages[1..=context.len()].iter().zip(&context) {
            assert_eq!(wire.role, original.role);
            assert_eq!(wire.content, vec![ContentPart::text(original.content.clone())]);
        }
        assert_eq!(messages.last().unwrap().as_text(), "is it sleeping?");
    }

    #[test]
    fn same_inputs_produce_same_payload() {
        let image = image();
        let context = vec![DialogueMessage::new(Role::User, "hi")];
        assert_eq!(
            build_request(&context, &image, "q"),
            build_request(&context, &image, "q")
        );
    }
}
