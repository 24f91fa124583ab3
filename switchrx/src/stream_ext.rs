use crate::Async;
use futures_core::stream::Stream;
use pin_project::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Extension trait for streams of [`Async`] statuses.
pub trait AsyncStreamExt<T, E>: Stream<Item = Async<T, E>> {
    /// Yields statuses up to and including the first complete one
    /// (`Success` or `Fail`), then ends.
    ///
    /// ## Examples
    ///
    /// ```
    /// use futures::StreamExt;
    /// use switchrx::{Async, AsyncStreamExt};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let statuses = futures::stream::iter(vec![
    ///     Async::<u32, String>::Loading(None),
    ///     Async::success(1),
    ///     Async::Loading(Some(1)),
    /// ]);
    ///
    /// let seen: Vec<_> = statuses.until_settled().collect().await;
    /// assert_eq!(seen, vec![Async::Loading(None), Async::success(1)]);
    /// # }
    /// ```
    fn until_settled(self) -> UntilSettled<Self>
    where
        Self: Sized,
    {
        UntilSettled {
            stream: self,
            settled: false,
        }
    }
}

impl<S, T, E> AsyncStreamExt<T, E> for S where S: Stream<Item = Async<T, E>> {}

/// Stream returned by [`AsyncStreamExt::until_settled`].
#[pin_project(project = UntilSettledProj)]
#[derive(Debug)]
#[must_use = "Streams do nothing unless polled"]
pub struct UntilSettled<S> {
    #[pin]
    stream: S,
    settled: bool,
}

impl<S, T, E> Stream for UntilSettled<S>
where
    S: Stream<Item = Async<T, E>>,
{
    type Item = Async<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let UntilSettledProj { stream, settled } = self.project();

        if *settled {
            return Poll::Ready(None);
        }
        match stream.poll_next(cx) {
            Poll::Ready(Some(status)) => {
                if status.is_complete() {
                    *settled = true;
                }
                Poll::Ready(Some(status))
            }
            Poll::Ready(None) => {
                *settled = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
