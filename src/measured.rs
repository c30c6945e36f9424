use iced::{
    Alignment, Color, Element, Event, Length, Padding, Rectangle, Size,
    Vector,
    advanced::{
        Clipboard, Layout, Shell, Widget, layout, mouse, overlay, renderer,
        widget::{Operation, Tree, tree},
    },
    alignment, event,
};

/// A container that reports its laid-out size.
///
/// `on_measure` is published whenever the size differs from the last
/// [`known`](Self::known) one, so the host can feed placement with the
/// content's natural size. Content is drawn with the given text color and
/// opacity, which lets the host render it invisibly while measuring.
#[allow(missing_debug_implementations)]
pub struct MeasuredContainer<
    'a,
    Message,
    Theme = iced::Theme,
    Renderer = iced::Renderer,
> where
    Renderer: renderer::Renderer,
{
    padding: Padding,
    width: Length,
    height: Length,
    horizontal_alignment: alignment::Horizontal,
    vertical_alignment: alignment::Vertical,
    known: Option<Size>,
    text_color: Option<Color>,
    opacity: f32,
    content: Element<'a, Message, Theme, Renderer>,
    on_measure: Box<dyn Fn(Size) -> Message + 'a>,
}

impl<'a, Message, Theme, Renderer> MeasuredContainer<'a, Message, Theme, Renderer>
where
    Renderer: renderer::Renderer,
{
    pub fn new<F>(
        content: impl Into<Element<'a, Message, Theme, Renderer>>,
        on_measure: F,
    ) -> Self
    where
        F: 'a + Fn(Size) -> Message,
    {
        let content = content.into();
        let size = content.as_widget().size_hint();

        MeasuredContainer {
            padding: Padding::ZERO,
            width: size.width.fluid(),
            height: size.height.fluid(),
            horizontal_alignment: alignment::Horizontal::Left,
            vertical_alignment: alignment::Vertical::Top,
            known: None,
            text_color: None,
            opacity: 1.0,
            content,
            on_measure: Box::new(on_measure),
        }
    }

    pub fn padding<P: Into<Padding>>(mut self, padding: P) -> Self {
        self.padding = padding.into();
        self
    }

    pub fn width(mut self, width: impl Into<Length>) -> Self {
        self.width = width.into();
        self
    }

    pub fn height(mut self, height: impl Into<Length>) -> Self {
        self.height = height.into();
        self
    }

    pub fn align_x(
        mut self,
        alignment: impl Into<alignment::Horizontal>,
    ) -> Self {
        self.horizontal_alignment = alignment.into();
        self
    }

    pub fn align_y(mut self, alignment: impl Into<alignment::Vertical>) -> Self {
        self.vertical_alignment = alignment.into();
        self
    }

    /// The size the host already holds. Matching layouts publish nothing.
    pub fn known(mut self, size: Option<Size>) -> Self {
        self.known = size;
        self
    }

    /// Text color for the content. `None` keeps the inherited one.
    pub fn text_color(mut self, color: Option<Color>) -> Self {
        self.text_color = color;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

impl<Message, Theme, Renderer> Widget<Message, Theme, Renderer>
    for MeasuredContainer<'_, Message, Theme, Renderer>
where
    Renderer: renderer::Renderer,
{
    fn tag(&self) -> tree::Tag {
        self.content.as_widget().tag()
    }

    fn state(&self) -> tree::State {
        self.content.as_widget().state()
    }

    fn children(&self) -> Vec<Tree> {
        self.content.as_widget().children()
    }

    fn diff(&self, tree: &mut Tree) {
        self.content.as_widget().diff(tree);
    }

    fn size(&self) -> Size<Length> {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    fn layout(
        &self,
        tree: &mut Tree,
        renderer: &Renderer,
        limits: &layout::Limits,
    ) -> layout::Node {
        let (align_x, align_y) = (
            Alignment::from(self.horizontal_alignment),
            Alignment::from(self.vertical_alignment),
        );
        layout::positioned(
            limits,
            self.width,
            self.height,
            self.padding,
            |limits| {
                self.content
                    .as_widget()
                    .layout(tree, renderer, &limits.loose())
            },
            |content, size| content.align(align_x, align_y, size),
        )
    }

    fn operate(
        &self,
        tree: &mut Tree,
        layout: Layout<'_>,
        renderer: &Renderer,
        operation: &mut dyn Operation,
    ) {
        if let Some(content) = layout.children().next() {
            self.content
                .as_widget()
                .operate(tree, content, renderer, operation);
        }
    }

    fn on_event(
        &mut self,
        tree: &mut Tree,
        event: Event,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        renderer: &Renderer,
        clipboard: &mut dyn Clipboard,
        shell: &mut Shell<'_, Message>,
        viewport: &Rectangle,
    ) -> event::Status {
        let size = layout.bounds().size();
        if self.known != Some(size) {
            shell.publish((self.on_measure)(size));
            self.known = Some(size);
        }

        let Some(content) = layout.children().next() else {
            return event::Status::Ignored;
        };
        self.content.as_widget_mut().on_event(
            tree, event, content, cursor, renderer, clipboard, shell, viewport,
        )
    }

    fn mouse_interaction(
        &self,
        tree: &Tree,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        viewport: &Rectangle,
        renderer: &Renderer,
    ) -> mouse::Interaction {
        layout.children().next().map_or(
            mouse::Interaction::default(),
            |content| {
                self.content.as_widget().mouse_interaction(
                    tree, content, cursor, viewport, renderer,
                )
            },
        )
    }

    fn draw(
        &self,
        tree: &Tree,
        renderer: &mut Renderer,
        theme: &Theme,
        renderer_style: &renderer::Style,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        viewport: &Rectangle,
    ) {
        let Some(content) = layout.children().next() else {
            return;
        };
        if layout.bounds().intersection(viewport).is_none() {
            return;
        }

        let text_color = self
            .text_color
            .unwrap_or(renderer_style.text_color)
            .scale_alpha(self.opacity);

        self.content.as_widget().draw(
            tree,
            renderer,
            theme,
            &renderer::Style { text_color },
            content,
            cursor,
            viewport,
        );
    }

    fn overlay<'b>(
        &'b mut self,
        tree: &'b mut Tree,
        layout: Layout<'_>,
        renderer: &Renderer,
        translation: Vector,
    ) -> Option<overlay::Element<'b, Message, Theme, Renderer>> {
        let content = layout.children().next()?;
        self.content
            .as_widget_mut()
            .overlay(tree, content, renderer, translation)
    }
}

impl<'a, Message, Theme, Renderer>
    From<MeasuredContainer<'a, Message, Theme, Renderer>>
    for Element<'a, Message, Theme, Renderer>
where
    Message: 'a,
    Theme: 'a,
    Renderer: renderer::Renderer + 'a,
{
    fn from(
        container: MeasuredContainer<'a, Message, Theme, Renderer>,
    ) -> Element<'a, Message, Theme, Renderer> {
        Element::new(container)
    }
}
